//! Durable single-document store
//!
//! The wallet lives in one JSON file. Writes go to `<path>.tmp` first, are
//! synced, then renamed over the target so readers only ever see a complete
//! document. A file that does not parse is moved aside to
//! `<path>.corrupted` and replaced with a fresh default document.
//!
//! All I/O here is blocking; async callers run it on the blocking pool.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wallet_common::config::StorageConfig;
use wallet_common::timestamp;
use wallet_common::{DEFAULT_WELCOME_MESSAGE, Error, Result, WalletDocument};

const TEMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".corrupted";

/// How [`DurableStore::load_with_outcome`] obtained its document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Parsed from the existing file
    Loaded,
    /// No file existed; defaults were created (and persisted if possible)
    Created,
    /// The file was malformed and moved to `backup`; defaults were created
    Recovered { backup: PathBuf },
    /// The file could not be read; defaults were returned without touching disk
    Fallback,
}

/// File-backed store for the wallet document
///
/// Every step that writes to disk (quarantine, bootstrap, save) runs under
/// one mutex shared by all clones of the store.
#[derive(Clone, Debug)]
pub struct DurableStore {
    path: PathBuf,
    welcome_message: String,
    io_lock: Arc<Mutex<()>>,
}

impl DurableStore {
    /// Create a store for the document at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            io_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a store from the storage section of the configuration
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.data_file()).with_welcome_message(config.welcome_message.clone())
    }

    /// Override the message written into freshly created documents
    #[must_use]
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// Path of the wallet document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path a malformed document is moved to
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, BACKUP_SUFFIX)
    }

    /// Path of the in-flight temporary file used by [`save`](Self::save)
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, TEMP_SUFFIX)
    }

    /// A fresh document stamped with the current time
    #[must_use]
    pub fn default_document(&self) -> WalletDocument {
        WalletDocument::with_defaults(self.welcome_message.clone(), timestamp::now())
    }

    /// Read and parse the document without any recovery
    ///
    /// Returns `Ok(None)` when no file exists.
    ///
    /// # Errors
    /// `Error::MalformedDocument` if the content is not a valid wallet
    /// document, `Error::DiskIo` for any other read failure.
    pub fn read(&self) -> Result<Option<WalletDocument>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let doc: WalletDocument =
            serde_json::from_slice(&raw).map_err(|e| Error::malformed(&self.path, e))?;
        Ok(Some(doc))
    }

    /// Load the document, recovering from a missing or malformed file
    ///
    /// Never fails; see [`load_with_outcome`](Self::load_with_outcome).
    pub fn load(&self) -> WalletDocument {
        self.load_with_outcome().0
    }

    /// Load the document and report which recovery path was taken
    ///
    /// A file that cannot be read, or a malformed one that cannot be moved
    /// aside, yields unpersisted defaults and [`LoadOutcome::Fallback`].
    pub fn load_with_outcome(&self) -> (WalletDocument, LoadOutcome) {
        self.load_checked().unwrap_or_else(|e| {
            error!(
                path = %self.path.display(),
                error = %e,
                "Failed to load wallet document, serving unpersisted defaults"
            );
            (self.default_document(), LoadOutcome::Fallback)
        })
    }

    /// Load the document as the base of a read-modify-write
    ///
    /// Bootstrap and quarantine happen as in [`load`](Self::load), but the
    /// unpersisted fallback is refused: saving on top of it would replace
    /// the history on disk.
    ///
    /// # Errors
    /// `Error::DiskIo` if the file cannot be read or a malformed file cannot
    /// be moved aside.
    pub fn load_for_update(&self) -> Result<WalletDocument> {
        self.load_checked().map(|(doc, _)| doc).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Refusing to update unreadable wallet document");
            e
        })
    }

    fn load_checked(&self) -> Result<(WalletDocument, LoadOutcome)> {
        match self.read() {
            Ok(Some(doc)) => {
                debug!(path = %self.path.display(), "Wallet document loaded");
                return Ok((doc, LoadOutcome::Loaded));
            }
            Err(e) if !e.is_malformed() => return Err(e),
            Ok(None) | Err(_) => {}
        }

        // Recovery writes to disk. Decide again under the lock: another
        // caller may have repaired the file since the unlocked read.
        let _guard = self.io_lock.lock();
        match self.read() {
            Ok(Some(doc)) => {
                debug!(path = %self.path.display(), "Wallet document repaired concurrently");
                Ok((doc, LoadOutcome::Loaded))
            }
            Ok(None) => {
                info!(path = %self.path.display(), "No existing wallet document, creating a new one");
                Ok((self.create_fresh_locked(), LoadOutcome::Created))
            }
            Err(e) if e.is_malformed() => {
                error!(path = %self.path.display(), error = %e, "Failed to decode wallet document");
                let backup = self.backup_path();
                warn!(backup = %backup.display(), "Moving corrupted wallet document aside");

                // Leave the evidence in place if it cannot be moved.
                fs::rename(&self.path, &backup).map_err(|rename_err| {
                    error!(
                        path = %self.path.display(),
                        error = %rename_err,
                        "Failed to quarantine corrupted wallet document"
                    );
                    Error::from(rename_err)
                })?;
                Ok((self.create_fresh_locked(), LoadOutcome::Recovered { backup }))
            }
            Err(e) => Err(e),
        }
    }

    /// Atomically replace the document on disk
    ///
    /// # Errors
    /// Returns the serialization or I/O failure. The temporary file is
    /// removed before returning.
    pub fn save(&self, doc: &WalletDocument) -> Result<()> {
        let _guard = self.io_lock.lock();
        self.save_locked(doc)
    }

    fn save_locked(&self, doc: &WalletDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;

        self.write_atomic(&bytes).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to save wallet document");
            Error::from(e)
        })?;

        debug!(path = %self.path.display(), transactions = doc.transactions.len(), "Wallet document saved");
        Ok(())
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = non_empty_parent(&self.path) {
            fs::create_dir_all(parent)?;
        }

        let mut temp = TempFile::create(self.temp_path())?;
        temp.write_all(bytes)?;
        temp.persist(&self.path)?;

        sync_parent_dir(&self.path);
        Ok(())
    }

    fn create_fresh_locked(&self) -> WalletDocument {
        let doc = self.default_document();
        match self.save_locked(&doc) {
            Ok(()) => info!(path = %self.path.display(), "Created new wallet document with default values"),
            Err(e) => error!(path = %self.path.display(), error = %e, "Failed to create new wallet document"),
        }
        doc
    }
}

/// Temporary file that deletes itself unless persisted
///
/// Removal happens in `Drop`, so every exit path (error, panic, or a caller
/// that gives up) cleans up.
struct TempFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    persisted: bool,
}

impl TempFile {
    fn create(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            persisted: false,
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("temporary file already closed"))?;

        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    fn persist(mut self, target: &Path) -> io::Result<()> {
        // Close the handle before renaming
        drop(self.writer.take());
        fs::rename(&self.path, target)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        drop(self.writer.take());
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temporary file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove temporary file"),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), error = %e, "Failed to sync directory after rename");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
