//! Core types, errors, and the credential store for twilens
//!
//! This crate provides the foundational types, error handling, credential
//! persistence, account registry, timezone configuration, and record
//! filtering used by all other twilens crates.

pub mod credential_store;
pub mod error;
pub mod filters;
pub mod registry;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{ApiError, ApiErrorKind, Result, TwilensError};
pub use types::{
    Account, AccountSid, ActivityKind, ActivityRecord, AuthToken, DateRange, Direction,
    ISOTimestamp, OwnedNumber, PhoneNumber, RecordSid,
};
