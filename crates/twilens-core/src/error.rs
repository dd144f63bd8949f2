//! Error types for twilens
//!
//! This module defines the error types used throughout the twilens library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use twilens_core::error::{Result, TwilensError};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to TwilensError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of remote API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Transport-level failure (DNS, connect, timeout)
    Network,
    /// Rejected credentials (401/403); never retried
    Auth,
    /// Provider throttled the request (429) past the retry budget
    RateLimited,
    /// The requested resource does not exist (404)
    NotFound,
    /// Any other failure, including malformed response bodies
    Unknown,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Auth => write!(f, "auth"),
            Self::RateLimited => write!(f, "rate-limited"),
            Self::NotFound => write!(f, "not-found"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Typed error for any failure while talking to the telephony API
///
/// Every HTTP-level problem (transport error, 4xx/5xx status, undecodable
/// body) is folded into one of the [`ApiErrorKind`] buckets so callers can
/// branch on the kind without string matching.
#[derive(Error, Debug)]
#[error("API error ({kind}): {message}")]
pub struct ApiError {
    /// Failure classification
    pub kind: ApiErrorKind,
    /// Human-readable detail, including status and body where available
    pub message: String,
}

impl ApiError {
    /// Create a new ApiError
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            ApiErrorKind::Unknown
        } else {
            ApiErrorKind::Network
        };
        Self::new(kind, err.to_string())
    }
}

/// Main error type for twilens operations
#[derive(Error, Debug)]
pub enum TwilensError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The credential file exists but cannot be parsed
    #[error("credential store at {path} is corrupt; fix or delete the file and re-add accounts")]
    CorruptStore {
        /// Path of the unreadable store file
        path: PathBuf,
    },

    /// Create-only insert hit an existing account name
    #[error("an account named '{0}' already exists")]
    DuplicateAccount(String),

    /// No stored account under the given name
    #[error("no account named '{0}'")]
    AccountNotFound(String),

    /// An operation needed an account but none was selected
    #[error("no account selected; pass --account or add one with 'accounts add'")]
    NoAccountSelected,

    /// Home directory could not be determined for the store path
    #[error("cannot determine home directory for the credential store")]
    NoHomeDirectory,

    /// Phone number cannot be normalized to E.164
    #[error("invalid phone number '{0}'; expected E.164 (+19193736940) or 10 digits")]
    InvalidPhoneNumber(String),

    /// Invalid date format
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Date range where the start falls after the end
    #[error("invalid date range: {since} is after {until}")]
    InvalidDateRange {
        /// Range start
        since: chrono::NaiveDate,
        /// Range end
        until: chrono::NaiveDate,
    },

    /// Invalid timezone
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The account owns no number matching the query
    #[error("number {0} is not owned by this account")]
    NumberNotFound(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Remote API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A spawned fetch task failed to complete
    #[error("background fetch failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for TwilensError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(err.into())
    }
}

/// Convenience type alias for Results in twilens
pub type Result<T> = std::result::Result<T, TwilensError>;
