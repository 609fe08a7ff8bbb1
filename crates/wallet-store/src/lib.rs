//! Wallet Store - persistence and state consistency
//!
//! Layers, leaf first:
//! - [`DurableStore`]: the single JSON document on disk, written with
//!   temp-file + rename and quarantined to `<path>.corrupted` when it fails
//!   to parse.
//! - [`StateCache`]: in-memory copy of the current value, message and last
//!   update time, authoritative for reads between writes.
//! - [`Ledger`]: append-only transaction history embedded in the document.
//! - [`Wallet`]: composes the three and serializes writers.

pub mod cache;
pub mod ledger;
pub mod store;
pub mod wallet;

pub use cache::StateCache;
pub use ledger::Ledger;
pub use store::{DurableStore, LoadOutcome};
pub use wallet::{TransactionsView, Wallet, WalletView};
