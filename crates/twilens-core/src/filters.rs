//! Filtering for fetched activity records
//!
//! The presentation layer narrows an already-fetched result set by a text
//! needle without re-querying; filtering never touches the network.
//!
//! # Examples
//!
//! ```
//! use twilens_core::filters::RecordFilter;
//!
//! let filter = RecordFilter::new().with_text("busy".to_string());
//! ```

use crate::types::{ActivityRecord, RecordDetail};

/// Case-insensitive substring filter across a record's visible fields
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    /// Needle matched against every displayed field; None matches all
    pub text: Option<String>,
}

impl RecordFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text needle
    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    /// Check whether a record passes the filter
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        let Some(needle) = &self.text else {
            return true;
        };
        let needle = needle.to_lowercase();

        let mut haystack = format!(
            "{} {} {} {} {}",
            record.direction, record.from, record.to, record.status, record.sid
        );
        match &record.detail {
            RecordDetail::Call { duration_secs } => {
                haystack.push_str(&format!(" {duration_secs}"));
            }
            RecordDetail::Message { body_preview, .. } => {
                haystack.push(' ');
                haystack.push_str(body_preview);
            }
        }

        haystack.to_lowercase().contains(&needle)
    }

    /// Retain only matching records
    pub fn apply(&self, records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
        if self.text.is_none() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
