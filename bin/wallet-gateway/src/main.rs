//! Wallet Gateway
//!
//! This binary serves the wallet tracker's HTTP API and page.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use wallet_common::Config;
use wallet_gateway::api::AppState;
use wallet_gateway::{logging, router};
use wallet_store::{DurableStore, Wallet};

#[derive(Parser, Debug)]
#[command(name = "wallet-gateway")]
#[command(about = "Wallet tracker HTTP service")]
#[command(version)]
struct Args {
    /// Configuration file path (optional; defaults apply if missing)
    #[arg(short, long, env = "WALLET_CONFIG", default_value = "wallet.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Directory holding the wallet document
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory served under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Directory holding index.html
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Do not write a log file
    #[arg(long, default_value_t = false)]
    no_log_file: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(dir) = self.data_dir {
            config.storage.data_dir = dir;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = dir;
        }
        if let Some(dir) = self.templates_dir {
            config.server.templates_dir = dir;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if self.no_log_file {
            config.logging.file_enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    let mut config = Config::load(Some(&args.config))?;
    args.apply(&mut config);
    config.validate()?;

    // Initialize logging
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting wallet gateway");
    info!("Wallet document: {}", config.storage.data_file().display());

    // Load the document once and seed the cache
    let store = DurableStore::from_config(&config.storage);
    let wallet = tokio::task::spawn_blocking(move || Wallet::open(store)).await?;

    let state = Arc::new(AppState::new(wallet, &config.server));
    let app = router(state);

    info!("Starting HTTP server on {}", config.server.listen);
    let listener = TcpListener::bind(config.server.listen).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await?;

    info!("Wallet gateway shut down gracefully");

    Ok(())
}
