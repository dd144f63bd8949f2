//! Terminal output formatting for twilens
//!
//! This crate provides table and JSON output formatters plus CSV
//! serialization for exporting fetched results.

pub mod csv;
pub mod output;

pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
