//! Twilio REST client for twilens
//!
//! This crate translates queries into authenticated HTTP calls against the
//! provider's REST endpoints and folds cursor pagination into single logical
//! result sets.

pub mod client;
mod wire;

pub use client::{DirectionalResults, TwilioClient};
