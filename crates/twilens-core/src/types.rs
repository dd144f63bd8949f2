//! Core domain types for twilens
//!
//! This module contains the fundamental types used throughout the twilens
//! library: strongly-typed wrappers for account credentials, phone numbers,
//! record identifiers and timestamps, plus the activity record shape every
//! query produces.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly-typed Twilio account SID wrapper
///
/// # Examples
/// ```
/// use twilens_core::types::AccountSid;
///
/// let sid = AccountSid::parse("AC00000000000000000000000000000000").unwrap();
/// assert!(sid.as_str().starts_with("AC"));
/// assert!(AccountSid::parse("not-a-sid").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSid(String);

impl AccountSid {
    /// Create an AccountSid without validation (trusted input, e.g. the store)
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    /// Validate and create an AccountSid from user input
    ///
    /// Account SIDs start with `AC` and are exactly 34 characters.
    pub fn parse(input: &str) -> crate::error::Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with("AC") && trimmed.len() == 34 {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(crate::error::TwilensError::InvalidArgument(format!(
                "account SID must start with 'AC' and be 34 characters (got {} characters)",
                trimmed.len()
            )))
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Auth token wrapper whose Debug output never leaks the secret
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Create an AuthToken without validation (trusted input, e.g. the store)
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Validate and create an AuthToken from user input
    pub fn parse(input: &str) -> crate::error::Result<Self> {
        let trimmed = input.trim();
        if trimmed.len() >= 32 {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(crate::error::TwilensError::InvalidArgument(format!(
                "auth token is too short ({} characters)",
                trimmed.len()
            )))
        }
    }

    /// Get the secret value
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

/// A named set of credentials for one Twilio sub-account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// User-chosen unique name
    pub name: String,
    /// Account SID used as the basic-auth username
    pub sid: AccountSid,
    /// Auth token used as the basic-auth password
    pub token: AuthToken,
}

impl Account {
    /// Create a new Account
    pub fn new(name: impl Into<String>, sid: AccountSid, token: AuthToken) -> Self {
        Self {
            name: name.into(),
            sid,
            token,
        }
    }
}

/// Provider-assigned record identifier (call or message SID)
///
/// Record SIDs are the deduplication key for blended query results and the
/// deterministic tie-break when two records share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordSid(String);

impl RecordSid {
    /// Create a new RecordSid
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// E.164 phone number
///
/// `parse` normalizes common US input shapes; `new` trusts provider-sourced
/// values that are already canonical.
///
/// # Examples
/// ```
/// use twilens_core::types::PhoneNumber;
///
/// assert_eq!(PhoneNumber::parse("9193736940").unwrap().as_str(), "+19193736940");
/// assert_eq!(PhoneNumber::parse("19193736940").unwrap().as_str(), "+19193736940");
/// assert_eq!(PhoneNumber::parse("+449193736940").unwrap().as_str(), "+449193736940");
/// assert!(PhoneNumber::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Wrap an already-canonical number (e.g. from the provider's number list)
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Normalize user input to E.164
    ///
    /// Accepted shapes: a `+`-prefixed number with 8-15 digits, a bare
    /// 10-digit US number (prefixed with `+1`), or an 11-digit number with a
    /// leading `1` (prefixed with `+`).
    pub fn parse(input: &str) -> crate::error::Result<Self> {
        let trimmed = input.trim();
        let invalid = || crate::error::TwilensError::InvalidPhoneNumber(input.to_string());

        if let Some(digits) = trimmed.strip_prefix('+') {
            if (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
                return Ok(Self(trimmed.to_string()));
            }
            return Err(invalid());
        }

        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        match trimmed.len() {
            10 => Ok(Self(format!("+1{trimmed}"))),
            11 if trimmed.starts_with('1') => Ok(Self(format!("+{trimmed}"))),
            _ => Err(invalid()),
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO timestamp wrapper for UTC timestamps
///
/// Provides a strongly-typed wrapper around chrono's `DateTime<Utc>` with
/// serialization support and a parser for the provider's RFC 2822 wire
/// format (`Tue, 02 Jul 2024 14:30:05 +0000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse the provider's RFC 2822 timestamp format
    pub fn from_rfc2822(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc2822(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

/// Inclusive civil date range for a query
///
/// # Examples
/// ```
/// use twilens_core::types::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(range.exclusive_end(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive)
    pub since: NaiveDate,
    /// Last day of the range (inclusive)
    pub until: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `since > until`
    pub fn new(since: NaiveDate, until: NaiveDate) -> crate::error::Result<Self> {
        if since > until {
            return Err(crate::error::TwilensError::InvalidDateRange { since, until });
        }
        Ok(Self { since, until })
    }

    /// The day after `until`, used as the exclusive upper query bound
    pub fn exclusive_end(&self) -> NaiveDate {
        self.until.succ_opt().unwrap_or(self.until)
    }
}

/// Kind of activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Voice call
    Call,
    /// SMS/MMS message
    Message,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "calls"),
            Self::Message => write!(f, "messages"),
        }
    }
}

/// Direction of a record relative to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Received by the account's number
    Inbound,
    /// Placed or sent by the account
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "Inbound"),
            Self::Outbound => write!(f, "Outbound"),
        }
    }
}

/// Kind-specific fields of an activity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordDetail {
    /// Call-specific fields
    Call {
        /// Call duration in seconds
        duration_secs: u64,
    },
    /// Message-specific fields
    Message {
        /// Body collapsed to one line and truncated for grid display
        body_preview: String,
        /// Provider error code, when delivery failed
        error_code: Option<i64>,
        /// Provider error description, when delivery failed
        error_message: Option<String>,
    },
}

/// One call or message returned by a search query
///
/// Produced only by the API client and immutable once fetched. The full
/// event trail or message body is fetched separately by SID for drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Provider-assigned identifier, unique per record
    pub sid: RecordSid,
    /// Call or message
    pub kind: ActivityKind,
    /// Direction relative to the account
    pub direction: Direction,
    /// Originating number as reported by the provider
    pub from: String,
    /// Destination number as reported by the provider
    pub to: String,
    /// Start time (calls) or sent time (messages), UTC
    pub timestamp: ISOTimestamp,
    /// Provider status/outcome string
    pub status: String,
    /// Kind-specific detail fields
    pub detail: RecordDetail,
}

/// Collapse newlines and truncate a message body for one-line display
pub fn preview_body(body: &str) -> String {
    let flat: String = body.replace(['\r', '\n'], " ");
    if flat.chars().count() > 50 {
        let head: String = flat.chars().take(50).collect();
        format!("{head}...")
    } else {
        flat
    }
}

/// A phone number owned by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedNumber {
    /// E.164 number
    pub phone_number: String,
    /// User-assigned label
    pub friendly_name: String,
    /// Provider-assigned number SID
    pub sid: String,
}

/// Voice/SMS/MMS capability flags of a number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Voice calls supported
    #[serde(default)]
    pub voice: bool,
    /// SMS supported
    #[serde(default)]
    pub sms: bool,
    /// MMS supported
    #[serde(default)]
    pub mms: bool,
}

/// Read-only configuration snapshot for a single number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberConfig {
    /// E.164 number
    pub phone_number: String,
    /// User-assigned label
    #[serde(default)]
    pub friendly_name: String,
    /// Provider-assigned number SID
    pub sid: String,
    /// Webhook invoked on incoming calls
    #[serde(default)]
    pub voice_url: Option<String>,
    /// HTTP method for the voice webhook
    #[serde(default)]
    pub voice_method: Option<String>,
    /// Fallback webhook when the voice webhook fails
    #[serde(default)]
    pub voice_fallback_url: Option<String>,
    /// Status callback URL
    #[serde(default)]
    pub status_callback: Option<String>,
    /// Webhook invoked on incoming messages
    #[serde(default)]
    pub sms_url: Option<String>,
    /// HTTP method for the SMS webhook
    #[serde(default)]
    pub sms_method: Option<String>,
    /// Fallback webhook when the SMS webhook fails
    #[serde(default)]
    pub sms_fallback_url: Option<String>,
    /// Capability flags
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Emergency calling status
    #[serde(default)]
    pub emergency_status: Option<String>,
    /// SIP trunk the number is attached to, if any
    #[serde(default)]
    pub trunk_sid: Option<String>,
    /// TwiML application handling voice, if any
    #[serde(default)]
    pub voice_application_sid: Option<String>,
    /// TwiML application handling SMS, if any
    #[serde(default)]
    pub sms_application_sid: Option<String>,
}

/// One entry in a call's event trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Event name
    #[serde(default)]
    pub name: Option<String>,
    /// Event timestamp as reported by the provider
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Raw request payload, when the event carries one
    #[serde(default)]
    pub request: Option<serde_json::Value>,
    /// Raw response payload, when the event carries one
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

/// Full detail for one message, fetched by SID for drill-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetail {
    /// Message SID
    pub sid: String,
    /// Provider direction string
    #[serde(default)]
    pub direction: Option<String>,
    /// Originating number
    #[serde(default)]
    pub from: Option<String>,
    /// Destination number
    #[serde(default)]
    pub to: Option<String>,
    /// Sent time, RFC 2822
    #[serde(default)]
    pub date_sent: Option<String>,
    /// Last update time, RFC 2822
    #[serde(default)]
    pub date_updated: Option<String>,
    /// Delivery status
    #[serde(default)]
    pub status: Option<String>,
    /// Full message body
    #[serde(default)]
    pub body: Option<String>,
    /// Provider error code, when delivery failed
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Provider error description, when delivery failed
    #[serde(default)]
    pub error_message: Option<String>,
    /// Price charged, as a decimal string
    #[serde(default)]
    pub price: Option<String>,
    /// Currency of the price
    #[serde(default)]
    pub price_unit: Option<String>,
    /// Segment count for long messages, as a decimal string
    #[serde(default)]
    pub num_segments: Option<String>,
    /// Attached media count, as a decimal string
    #[serde(default)]
    pub num_media: Option<String>,
}

/// A number flagged by the inactivity scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveNumber {
    /// E.164 number
    pub phone_number: String,
    /// User-assigned label
    pub friendly_name: String,
    /// Most recent activity across both directions, or None when no
    /// activity was ever recorded
    pub last_activity: Option<ISOTimestamp>,
}

/// Summary counts for a set of activity records, shown in table footers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total record count
    pub records: usize,
    /// Inbound record count
    pub inbound: usize,
    /// Outbound record count
    pub outbound: usize,
}

impl Totals {
    /// Compute totals over a record slice
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        let inbound = records
            .iter()
            .filter(|r| r.direction == Direction::Inbound)
            .count();
        Self {
            records: records.len(),
            inbound,
            outbound: records.len() - inbound,
        }
    }
}
