//! Transaction ledger
//!
//! The ledger is the `transactions` array inside the wallet document. An
//! append always re-reads the document from disk, pushes the entry and
//! writes the whole document back; entries are never edited or removed.
//!
//! [`Ledger::append`] is a plain read-modify-write. Two unsynchronized
//! callers can each read the same document and the second save drops the
//! first entry, so callers must serialize appends themselves (the
//! [`Wallet`](crate::Wallet) holds a writer lock for this).

use crate::store::DurableStore;
use tracing::debug;
use wallet_common::timestamp::Timestamp;
use wallet_common::{CurrentState, Result, Transaction, WalletDocument};

/// Entry recorded when the value changes
#[must_use]
pub fn value_update(before: &CurrentState, new_value: f64, at: Timestamp) -> Transaction {
    Transaction {
        timestamp: at,
        value: new_value,
        previous_value: before.value,
        message: format!("Updated value to {}", format_amount(new_value)),
    }
}

/// Entry recorded when only the message changes
#[must_use]
pub fn message_update(before: &CurrentState, message: &str, at: Timestamp) -> Transaction {
    Transaction {
        timestamp: at,
        value: before.value,
        previous_value: before.value,
        message: message.to_string(),
    }
}

/// Render an amount the way a float literal reads: `42.0`, `42.5`, `0.1`
///
/// Very large or very small magnitudes switch to exponent form (`1e20`),
/// which still reads as a float literal.
#[must_use]
pub fn format_amount(value: f64) -> String {
    format!("{value:?}")
}

/// Append-only transaction history backed by the durable store
#[derive(Debug)]
pub struct Ledger {
    store: DurableStore,
}

impl Ledger {
    pub const fn new(store: DurableStore) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &DurableStore {
        &self.store
    }

    /// All entries, freshly read from disk, oldest first
    pub fn entries(&self) -> Vec<Transaction> {
        self.store.load().transactions
    }

    /// Append `entry` and persist it together with `current`
    ///
    /// The document is reloaded first so entries written since the last
    /// read are kept. Returns the merged document as written.
    ///
    /// # Errors
    /// Fails without writing if the document cannot be read back (a missing
    /// or malformed file is still recovered), and propagates the store's
    /// save failure.
    pub fn append(&self, entry: Transaction, current: &CurrentState) -> Result<WalletDocument> {
        let mut doc = self.store.load_for_update()?;
        doc.transactions.push(entry);
        doc.apply_current(current);

        self.store.save(&doc)?;
        debug!(entries = doc.transactions.len(), "Ledger entry appended");
        Ok(doc)
    }
}
