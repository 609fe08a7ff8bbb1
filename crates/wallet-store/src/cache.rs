//! In-memory state cache
//!
//! Holds the current value, message and last update time so reads do not
//! need to touch disk. Built once from the loaded document at startup and
//! changed only by the write path in [`Wallet`](crate::Wallet).

use parking_lot::RwLock;
use wallet_common::timestamp::Timestamp;
use wallet_common::{CurrentState, WalletDocument};

/// Process-wide mirror of the document's current fields
#[derive(Debug)]
pub struct StateCache {
    inner: RwLock<CurrentState>,
}

impl StateCache {
    #[must_use]
    pub fn new(initial: CurrentState) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Seed the cache from a loaded document
    #[must_use]
    pub fn from_document(doc: &WalletDocument) -> Self {
        Self::new(doc.current())
    }

    /// Consistent copy of all three fields
    pub fn snapshot(&self) -> CurrentState {
        self.inner.read().clone()
    }

    /// Timestamp to use for a write happening at `now`
    ///
    /// Never earlier than the current `last_updated`, so a wall clock that
    /// steps backwards cannot make `last_updated` decrease.
    pub fn next_stamp(&self, now: Timestamp) -> Timestamp {
        now.max(self.inner.read().last_updated)
    }

    /// Replace the value and return the new snapshot
    pub fn set_value(&self, value: f64, at: Timestamp) -> CurrentState {
        let mut state = self.inner.write();
        state.value = value;
        state.last_updated = at.max(state.last_updated);
        state.clone()
    }

    /// Replace the message and return the new snapshot
    pub fn set_message(&self, message: impl Into<String>, at: Timestamp) -> CurrentState {
        let mut state = self.inner.write();
        state.message = message.into();
        state.last_updated = at.max(state.last_updated);
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn cache_at(at: Timestamp) -> StateCache {
        StateCache::new(CurrentState {
            value: 1.5,
            message: "start".to_string(),
            last_updated: at,
        })
    }

    #[test]
    fn test_from_document() {
        let doc = WalletDocument::default();
        let cache = StateCache::from_document(&doc);
        assert_eq!(cache.snapshot(), doc.current());
    }

    #[test]
    fn test_set_value_keeps_message() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let cache = cache_at(t0);

        let after = cache.set_value(42.5, t0 + Duration::seconds(1));
        assert!((after.value - 42.5).abs() < f64::EPSILON);
        assert_eq!(after.message, "start");
        assert_eq!(after.last_updated, t0 + Duration::seconds(1));
        assert_eq!(cache.snapshot(), after);
    }

    #[test]
    fn test_set_message_keeps_value() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let cache = cache_at(t0);

        let after = cache.set_message("Bonus!", t0 + Duration::seconds(1));
        assert_eq!(after.message, "Bonus!");
        assert!((cache.snapshot().value - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_updated_never_decreases() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let cache = cache_at(t0);

        let earlier = t0 - Duration::minutes(5);
        assert_eq!(cache.next_stamp(earlier), t0);

        let after = cache.set_value(2.0, earlier);
        assert_eq!(after.last_updated, t0);
    }
}
