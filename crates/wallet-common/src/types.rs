//! Persisted data model
//!
//! A [`WalletDocument`] is the single JSON document written to disk. It holds
//! the current value and message together with the transaction ledger.

use crate::timestamp::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// Welcome message written into a freshly created document
pub const DEFAULT_WELCOME_MESSAGE: &str = "Bienvenue sur le portefeuille de Marcel !";

/// One immutable ledger entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the change happened
    #[serde(with = "timestamp")]
    pub timestamp: Timestamp,
    /// Value after the change (unchanged for message-only updates)
    pub value: f64,
    /// Value before the change
    pub previous_value: f64,
    /// Human-readable description
    pub message: String,
}

/// The full persisted wallet state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletDocument {
    pub current_value: f64,
    pub current_message: String,
    #[serde(with = "timestamp")]
    pub last_updated: Timestamp,
    /// Append-only, oldest first
    pub transactions: Vec<Transaction>,
}

impl WalletDocument {
    /// A fresh document: zero value, the given greeting, empty ledger
    #[must_use]
    pub fn with_defaults(welcome_message: impl Into<String>, now: Timestamp) -> Self {
        Self {
            current_value: 0.0,
            current_message: welcome_message.into(),
            last_updated: now,
            transactions: Vec::new(),
        }
    }

    /// The "current" fields of this document
    #[must_use]
    pub fn current(&self) -> CurrentState {
        CurrentState {
            value: self.current_value,
            message: self.current_message.clone(),
            last_updated: self.last_updated,
        }
    }

    /// Overwrite the current fields, leaving the ledger alone
    pub fn apply_current(&mut self, current: &CurrentState) {
        self.current_value = current.value;
        self.current_message.clone_from(&current.message);
        self.last_updated = current.last_updated;
    }
}

impl Default for WalletDocument {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_WELCOME_MESSAGE, timestamp::now())
    }
}

/// Snapshot of the value, message and last update time
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentState {
    pub value: f64,
    pub message: String,
    pub last_updated: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> WalletDocument {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        WalletDocument {
            current_value: 42.5,
            current_message: "Bonus!".to_string(),
            last_updated: at,
            transactions: vec![Transaction {
                timestamp: at,
                value: 42.5,
                previous_value: 0.0,
                message: "Updated value to 42.5".to_string(),
            }],
        }
    }

    #[test]
    fn test_default_document() {
        let doc = WalletDocument::default();
        assert!(doc.current_value.abs() < f64::EPSILON);
        assert_eq!(doc.current_message, DEFAULT_WELCOME_MESSAGE);
        assert!(doc.transactions.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["current_value"], 42.5);
        assert_eq!(json["current_message"], "Bonus!");
        assert_eq!(json["last_updated"], "2024-05-01T10:00:00.000000Z");
        assert_eq!(json["transactions"][0]["previous_value"], 0.0);
        assert_eq!(
            json["transactions"][0]["timestamp"],
            "2024-05-01T10:00:00.000000Z"
        );
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let raw = r#"{"current_value": 1.0, "current_message": "hi", "last_updated": "2024-05-01T10:00:00"}"#;
        assert!(serde_json::from_str::<WalletDocument>(raw).is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let raw = r#"{"current_value": "ten", "current_message": "hi",
                      "last_updated": "2024-05-01T10:00:00", "transactions": []}"#;
        assert!(serde_json::from_str::<WalletDocument>(raw).is_err());
    }

    #[test]
    fn test_apply_current_keeps_ledger() {
        let mut doc = sample();
        let current = CurrentState {
            value: 7.0,
            message: "seven".to_string(),
            last_updated: doc.last_updated,
        };
        doc.apply_current(&current);
        assert_eq!(doc.current(), current);
        assert_eq!(doc.transactions.len(), 1);
    }
}
