//! Wallet facade
//!
//! Ties the cache, the ledger and the store together and defines the read
//! and write paths used by the HTTP handlers.
//!
//! Reads are blended: the current fields come from the cache while the
//! transactions are re-read from disk on every call. A read that overlaps a
//! write can therefore return current fields and transactions from different
//! moments.
//!
//! Writes take a single writer lock for the whole sequence (cache update,
//! reload, append, save), so appends from this process are never lost. The
//! store serializes its own disk writes, so a read that has to repair a
//! missing or corrupted file cannot clobber a concurrent save. The cache is
//! updated before the save and is not rolled back if the save fails; the
//! next successful write persists it.

use crate::cache::StateCache;
use crate::ledger::{self, Ledger};
use crate::store::DurableStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use wallet_common::timestamp::{self, Timestamp};
use wallet_common::{CurrentState, Error, Result, Transaction};

/// Response shape for `/value`, `POST /value` and `POST /message`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletView {
    pub value: f64,
    pub message: String,
    #[serde(with = "timestamp")]
    pub last_updated: Timestamp,
    pub transactions: Vec<Transaction>,
}

impl WalletView {
    fn new(current: CurrentState, transactions: Vec<Transaction>) -> Self {
        Self {
            value: current.value,
            message: current.message,
            last_updated: current.last_updated,
            transactions,
        }
    }
}

/// Response shape for `/transactions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionsView {
    pub transactions: Vec<Transaction>,
}

/// The wallet: cached current state plus the persisted ledger
#[derive(Debug)]
pub struct Wallet {
    cache: StateCache,
    ledger: Ledger,
    write_lock: Mutex<()>,
}

impl Wallet {
    /// Load the document once and seed the cache from it
    pub fn open(store: DurableStore) -> Self {
        let (doc, outcome) = store.load_with_outcome();
        info!(
            path = %store.path().display(),
            ?outcome,
            value = doc.current_value,
            transactions = doc.transactions.len(),
            "Wallet opened"
        );

        Self {
            cache: StateCache::from_document(&doc),
            ledger: Ledger::new(store),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn current(&self) -> CurrentState {
        self.cache.snapshot()
    }

    pub const fn store(&self) -> &DurableStore {
        self.ledger.store()
    }

    /// Cached current fields with freshly loaded transactions
    pub fn view(&self) -> WalletView {
        let current = self.cache.snapshot();
        WalletView::new(current, self.ledger.entries())
    }

    /// Freshly loaded transactions
    pub fn transactions(&self) -> TransactionsView {
        TransactionsView {
            transactions: self.ledger.entries(),
        }
    }

    /// Set a new value and record it in the ledger
    ///
    /// # Errors
    /// `Error::InvalidArgument` for a non-finite value; otherwise the
    /// store's failure to read back or save the document.
    pub fn update_value(&self, new_value: f64) -> Result<WalletView> {
        if !new_value.is_finite() {
            return Err(Error::invalid_argument(format!(
                "new_value must be a finite number, got {new_value}"
            )));
        }

        let _writer = self.write_lock.lock();
        let before = self.cache.snapshot();
        let at = self.cache.next_stamp(timestamp::now());

        let entry = ledger::value_update(&before, new_value, at);
        let after = self.cache.set_value(new_value, at);
        let doc = self.ledger.append(entry, &after)?;

        info!(previous = before.value, value = after.value, "Value updated");
        Ok(WalletView::new(after, doc.transactions))
    }

    /// Set a new message and record it in the ledger
    ///
    /// # Errors
    /// Propagates the store's failure to read back or save the document.
    pub fn update_message(&self, message: impl Into<String>) -> Result<WalletView> {
        let message = message.into();

        let _writer = self.write_lock.lock();
        let before = self.cache.snapshot();
        let at = self.cache.next_stamp(timestamp::now());

        let entry = ledger::message_update(&before, &message, at);
        let after = self.cache.set_message(message, at);
        let doc = self.ledger.append(entry, &after)?;

        info!(new_message = %after.message, "Message updated");
        Ok(WalletView::new(after, doc.transactions))
    }
}
