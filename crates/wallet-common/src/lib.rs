//! Wallet Common - Shared types and utilities
//!
//! This crate provides the persisted data model, error definitions and
//! configuration used by the store and the HTTP gateway.

pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
