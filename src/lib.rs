//! twilens - Inspect Twilio call and message activity across accounts
//!
//! This library provides functionality to:
//! - Store named account credentials in a local file (encoded, not encrypted)
//! - Search call and message logs for a number over a date range, blending
//!   both directions into one deduplicated, time-ordered view
//! - Scan owned numbers for inactivity
//! - Fetch number configuration and per-record drill-down detail
//! - Render results as tables or JSON and export them to CSV
//!
//! # Examples
//!
//! ```no_run
//! use twilens::aggregation::combine;
//! use twilens_api::TwilioClient;
//! use twilens_core::credential_store::CredentialStore;
//! use twilens_core::registry::AccountRegistry;
//! use twilens_core::types::{DateRange, PhoneNumber};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> twilens::Result<()> {
//!     let mut registry = AccountRegistry::new(CredentialStore::load_default()?);
//!     registry.set_active("prod")?;
//!
//!     let client = TwilioClient::new(&registry.active()?)?;
//!     let number = PhoneNumber::parse("+19193736940")?;
//!     let range = DateRange::new(
//!         NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
//!     )?;
//!
//!     let results = client.search_calls(&number, &range).await?;
//!     let blended = combine(results.to, results.from);
//!     println!("{} calls", blended.len());
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;

// Re-export commonly used types
pub use twilens_core::error::{ApiError, ApiErrorKind, Result, TwilensError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
