//! Wire-format types for the provider's REST responses
//!
//! List endpoints wrap their records in a page envelope carrying a
//! `next_page_uri` cursor; raw records are converted into domain
//! [`ActivityRecord`]s here, skipping entries whose timestamps do not parse
//! rather than failing the whole page.

use serde::Deserialize;
use twilens_core::types::{
    ActivityKind, ActivityRecord, CallEvent, Direction, ISOTimestamp, OwnedNumber, RecordDetail,
    RecordSid, preview_body,
};

/// A paginated response envelope
pub(crate) trait Page {
    /// Record type carried by the page
    type Item;

    /// Cursor to the next page, relative to the API root
    fn next_page_uri(&self) -> Option<&str>;

    /// Consume the page, yielding its records
    fn into_items(self) -> Vec<Self::Item>;
}

/// One page of call records
#[derive(Debug, Deserialize)]
pub(crate) struct CallsPage {
    #[serde(default)]
    pub calls: Vec<RawCall>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

impl Page for CallsPage {
    type Item = RawCall;

    fn next_page_uri(&self) -> Option<&str> {
        self.next_page_uri.as_deref()
    }

    fn into_items(self) -> Vec<RawCall> {
        self.calls
    }
}

/// Call record as returned by the provider
#[derive(Debug, Deserialize)]
pub(crate) struct RawCall {
    pub sid: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// RFC 2822 start time
    #[serde(default)]
    pub start_time: String,
    /// Duration in seconds, as a decimal string
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl RawCall {
    /// Convert into a domain record; None when the timestamp does not parse
    pub fn into_record(self) -> Option<ActivityRecord> {
        let timestamp = ISOTimestamp::from_rfc2822(&self.start_time)?;
        let duration_secs = self
            .duration
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        Some(ActivityRecord {
            sid: RecordSid::new(self.sid),
            kind: ActivityKind::Call,
            direction: direction_from_wire(&self.direction),
            from: self.from,
            to: self.to,
            timestamp,
            status: self.status,
            detail: RecordDetail::Call { duration_secs },
        })
    }
}

/// One page of message records
#[derive(Debug, Deserialize)]
pub(crate) struct MessagesPage {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

impl Page for MessagesPage {
    type Item = RawMessage;

    fn next_page_uri(&self) -> Option<&str> {
        self.next_page_uri.as_deref()
    }

    fn into_items(self) -> Vec<RawMessage> {
        self.messages
    }
}

/// Message record as returned by the provider
#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub sid: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// RFC 2822 sent time
    #[serde(default)]
    pub date_sent: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RawMessage {
    /// Convert into a domain record; None when the timestamp does not parse
    pub fn into_record(self) -> Option<ActivityRecord> {
        let timestamp = ISOTimestamp::from_rfc2822(&self.date_sent)?;
        Some(ActivityRecord {
            sid: RecordSid::new(self.sid),
            kind: ActivityKind::Message,
            direction: direction_from_wire(&self.direction),
            from: self.from,
            to: self.to,
            timestamp,
            status: self.status,
            detail: RecordDetail::Message {
                body_preview: preview_body(&self.body),
                error_code: self.error_code,
                error_message: self.error_message,
            },
        })
    }
}

/// One page of owned numbers
#[derive(Debug, Deserialize)]
pub(crate) struct NumbersPage {
    #[serde(default)]
    pub incoming_phone_numbers: Vec<OwnedNumber>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

impl Page for NumbersPage {
    type Item = OwnedNumber;

    fn next_page_uri(&self) -> Option<&str> {
        self.next_page_uri.as_deref()
    }

    fn into_items(self) -> Vec<OwnedNumber> {
        self.incoming_phone_numbers
    }
}

/// Event trail envelope for one call
#[derive(Debug, Deserialize)]
pub(crate) struct EventsPage {
    #[serde(default)]
    pub events: Vec<CallEvent>,
}

/// Provider direction strings beginning `outbound` (e.g. `outbound-api`,
/// `outbound-dial`) are outbound; everything else is inbound.
fn direction_from_wire(direction: &str) -> Direction {
    if direction.starts_with("outbound") {
        Direction::Outbound
    } else {
        Direction::Inbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_calls_page_deserialization() {
        let json = r#"{
            "calls": [{
                "sid": "CA1",
                "direction": "outbound-dial",
                "from": "+15550001111",
                "to": "+15550002222",
                "start_time": "Tue, 02 Jul 2024 14:30:05 +0000",
                "duration": "42",
                "status": "completed",
                "price": "-0.02"
            }],
            "next_page_uri": "/2010-04-01/Accounts/AC0/Calls.json?Page=1"
        }"#;

        let page: CallsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_uri().unwrap(), "/2010-04-01/Accounts/AC0/Calls.json?Page=1");

        let record = page.into_items().remove(0).into_record().unwrap();
        assert_eq!(record.sid.as_str(), "CA1");
        assert_eq!(record.kind, ActivityKind::Call);
        assert_eq!(record.direction, Direction::Outbound);
        assert_eq!(
            record.timestamp.inner(),
            &Utc.with_ymd_and_hms(2024, 7, 2, 14, 30, 5).unwrap()
        );
        assert_eq!(record.detail, RecordDetail::Call { duration_secs: 42 });
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: CallsPage = serde_json::from_str(r#"{"calls": []}"#).unwrap();
        assert!(page.next_page_uri().is_none());
    }

    #[test]
    fn test_message_conversion() {
        let json = r#"{
            "sid": "SM1",
            "direction": "inbound",
            "from": "+15550001111",
            "to": "+15550002222",
            "date_sent": "Tue, 02 Jul 2024 14:30:05 +0000",
            "body": "line one\nline two",
            "status": "received",
            "error_code": null,
            "error_message": null
        }"#;

        let record = serde_json::from_str::<RawMessage>(json)
            .unwrap()
            .into_record()
            .unwrap();
        assert_eq!(record.kind, ActivityKind::Message);
        assert_eq!(record.direction, Direction::Inbound);
        assert_eq!(
            record.detail,
            RecordDetail::Message {
                body_preview: "line one line two".to_string(),
                error_code: None,
                error_message: None,
            }
        );
    }

    #[test]
    fn test_bad_timestamp_is_skipped() {
        let raw = RawCall {
            sid: "CA1".to_string(),
            direction: "inbound".to_string(),
            from: String::new(),
            to: String::new(),
            start_time: "garbage".to_string(),
            duration: None,
            status: "completed".to_string(),
        };
        assert!(raw.into_record().is_none());
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(direction_from_wire("outbound-api"), Direction::Outbound);
        assert_eq!(direction_from_wire("outbound-dial"), Direction::Outbound);
        assert_eq!(direction_from_wire("inbound"), Direction::Inbound);
        assert_eq!(direction_from_wire(""), Direction::Inbound);
    }
}
