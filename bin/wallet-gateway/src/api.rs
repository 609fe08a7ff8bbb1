//! Axum handlers for the wallet HTTP API.
//!
//! Store access is blocking file I/O, so every handler hands its work to
//! the blocking pool. A request whose client disconnects still runs its
//! store call to completion.

use crate::error::ApiError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wallet_common::config::ServerConfig;
use wallet_store::{TransactionsView, Wallet, WalletView};

type Result<T> = std::result::Result<T, ApiError>;

/// Shared state for the wallet handlers.
pub struct AppState {
    pub wallet: Arc<Wallet>,
    /// Directory holding `index.html`
    pub templates_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(wallet: Wallet, server: &ServerConfig) -> Self {
        Self {
            wallet: Arc::new(wallet),
            templates_dir: server.templates_dir.clone(),
            static_dir: server.static_dir.clone(),
        }
    }

    /// Run a store operation on the blocking pool.
    async fn with_wallet<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Wallet) -> wallet_common::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let wallet = Arc::clone(&self.wallet);
        tokio::task::spawn_blocking(move || op(&wallet))
            .await
            .map_err(|e| ApiError::internal(format!("store task failed: {e}")))?
            .map_err(ApiError::from)
    }
}

/// Body of `POST /value`.
#[derive(Debug, Deserialize)]
pub struct ValueUpdate {
    pub new_value: f64,
}

/// Body of `POST /message`.
#[derive(Debug, Deserialize)]
pub struct MessageUpdate {
    pub message: String,
}

/// GET /
///
/// # Errors
/// Returns 404 if the page template is missing.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    info!("Homepage accessed");
    let path = state.templates_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ApiError::not_found(format!(
            "template not found: {}",
            path.display()
        ))),
        Err(e) => Err(ApiError::internal(format!(
            "failed to read template {}: {e}",
            path.display()
        ))),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /value
///
/// Current fields come from the cache, transactions from disk.
///
/// # Errors
/// Returns 500 if the blocking task fails.
pub async fn get_value(State(state): State<Arc<AppState>>) -> Result<Json<WalletView>> {
    info!("Value requested");
    let view = state.with_wallet(|wallet| Ok(wallet.view())).await?;
    Ok(Json(view))
}

/// POST /value
///
/// # Errors
/// 4xx for a malformed body or a non-finite value, 500 if the save fails.
pub async fn set_value(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ValueUpdate>, JsonRejection>,
) -> Result<Json<WalletView>> {
    let Json(update) = body?;
    if !update.new_value.is_finite() {
        return Err(ApiError::unprocessable("new_value must be a finite number"));
    }

    let view = state
        .with_wallet(move |wallet| wallet.update_value(update.new_value))
        .await?;
    Ok(Json(view))
}

/// POST /message
///
/// # Errors
/// 4xx for a malformed body, 500 if the save fails.
pub async fn set_message(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<MessageUpdate>, JsonRejection>,
) -> Result<Json<WalletView>> {
    let Json(update) = body?;

    let view = state
        .with_wallet(move |wallet| wallet.update_message(update.message))
        .await?;
    Ok(Json(view))
}

/// GET /transactions
///
/// # Errors
/// Returns 500 if the blocking task fails.
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransactionsView>> {
    let view = state.with_wallet(|wallet| Ok(wallet.transactions())).await?;
    Ok(Json(view))
}
