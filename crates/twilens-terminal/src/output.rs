//! Output formatting for fetched results
//!
//! Provides formatters for displaying results in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```no_run
//! use twilens_terminal::output::get_formatter;
//! use twilens_core::types::{ActivityKind, Totals};
//! use chrono_tz::Tz;
//!
//! let records = Vec::new();
//! let totals = Totals::from_records(&records);
//!
//! let formatter = get_formatter(false);
//! println!("{}", formatter.format_activity(ActivityKind::Call, &records, &totals, &Tz::UTC));
//! ```

use chrono_tz::Tz;
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;
use twilens_core::types::{
    ActivityKind, ActivityRecord, CallEvent, InactiveNumber, ISOTimestamp, MessageDetail,
    NumberConfig, OwnedNumber, RecordDetail, Totals,
};

/// Render a timestamp in the configured timezone
pub fn format_timestamp(ts: &ISOTimestamp, tz: &Tz) -> String {
    ts.inner()
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Column headers for an activity table of the given kind
pub fn activity_columns(kind: ActivityKind) -> [&'static str; 7] {
    match kind {
        ActivityKind::Call => [
            "Direction",
            "From",
            "To",
            "Start Time",
            "Duration (s)",
            "Status",
            "SID",
        ],
        ActivityKind::Message => [
            "Direction",
            "From",
            "To",
            "Date Sent",
            "Message",
            "Status",
            "SID",
        ],
    }
}

/// Trait for output formatters
///
/// Implementations render each result shape the CLI can produce; table and
/// JSON implementations ship here, CSV export lives in [`crate::csv`].
pub trait OutputFormatter {
    /// Format a blended activity result set with its totals
    fn format_activity(
        &self,
        kind: ActivityKind,
        records: &[ActivityRecord],
        totals: &Totals,
        tz: &Tz,
    ) -> String;

    /// Format the account's owned-number list
    fn format_numbers(&self, numbers: &[OwnedNumber]) -> String;

    /// Format an inactive-number report
    fn format_inactive(
        &self,
        inactive: &[InactiveNumber],
        scanned: usize,
        threshold_days: u32,
        tz: &Tz,
    ) -> String;

    /// Format a number configuration snapshot
    fn format_number_config(&self, config: &NumberConfig) -> String;

    /// Format a call's event trail
    fn format_call_events(&self, call_sid: &str, events: &[CallEvent]) -> String;

    /// Format full message detail
    fn format_message_detail(&self, detail: &MessageDetail) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new() -> Self {
        Self
    }

    fn base_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_activity(
        &self,
        kind: ActivityKind,
        records: &[ActivityRecord],
        totals: &Totals,
        tz: &Tz,
    ) -> String {
        let mut table = Self::base_table();
        let columns = activity_columns(kind);
        table.set_titles(row![
            b -> columns[0], b -> columns[1], b -> columns[2], b -> columns[3],
            b -> columns[4], b -> columns[5], b -> columns[6]
        ]);

        for record in records {
            let detail_cell = match &record.detail {
                RecordDetail::Call { duration_secs } => duration_secs.to_string(),
                RecordDetail::Message { body_preview, .. } => body_preview.clone(),
            };
            table.add_row(row![
                record.direction.to_string(),
                record.from,
                record.to,
                format_timestamp(&record.timestamp, tz),
                detail_cell,
                record.status,
                record.sid.as_str()
            ]);
        }

        format!(
            "{}\n{} {kind} ({} inbound, {} outbound)",
            table,
            totals.records.to_string().bold(),
            totals.inbound,
            totals.outbound
        )
    }

    fn format_numbers(&self, numbers: &[OwnedNumber]) -> String {
        let mut table = Self::base_table();
        table.set_titles(row![b -> "Phone Number", b -> "Friendly Name", b -> "SID"]);
        for number in numbers {
            table.add_row(row![number.phone_number, number.friendly_name, number.sid]);
        }
        format!("{}\n{} numbers", table, numbers.len().to_string().bold())
    }

    fn format_inactive(
        &self,
        inactive: &[InactiveNumber],
        scanned: usize,
        threshold_days: u32,
        tz: &Tz,
    ) -> String {
        let mut table = Self::base_table();
        table.set_titles(row![b -> "Phone Number", b -> "Friendly Name", b -> "Last Activity"]);
        for entry in inactive {
            let last = match &entry.last_activity {
                Some(ts) => format_timestamp(ts, tz),
                None => "never".to_string(),
            };
            table.add_row(row![entry.phone_number, entry.friendly_name, last]);
        }
        format!(
            "{}\n{} of {} numbers had no activity in the last {} days",
            table,
            inactive.len().to_string().bold(),
            scanned,
            threshold_days
        )
    }

    fn format_number_config(&self, config: &NumberConfig) -> String {
        let mut table = Self::base_table();
        table.set_titles(row![b -> "Setting", b -> "Value"]);

        table.add_row(row!["Phone Number", config.phone_number]);
        table.add_row(row!["Friendly Name", config.friendly_name]);
        table.add_row(row!["SID", config.sid]);

        let optional = [
            ("Voice URL", &config.voice_url),
            ("Voice Method", &config.voice_method),
            ("Voice Fallback URL", &config.voice_fallback_url),
            ("Status Callback URL", &config.status_callback),
            ("SMS URL", &config.sms_url),
            ("SMS Method", &config.sms_method),
            ("SMS Fallback URL", &config.sms_fallback_url),
            ("Emergency Status", &config.emergency_status),
            ("Trunk SID", &config.trunk_sid),
            ("Voice Application SID", &config.voice_application_sid),
            ("SMS Application SID", &config.sms_application_sid),
        ];
        for (label, value) in optional {
            if let Some(value) = value
                && !value.is_empty()
            {
                table.add_row(row![label, value]);
            }
        }

        let mut capabilities = Vec::new();
        if config.capabilities.voice {
            capabilities.push("voice");
        }
        if config.capabilities.sms {
            capabilities.push("sms");
        }
        if config.capabilities.mms {
            capabilities.push("mms");
        }
        table.add_row(row!["Capabilities", capabilities.join(", ")]);

        table.to_string()
    }

    fn format_call_events(&self, call_sid: &str, events: &[CallEvent]) -> String {
        if events.is_empty() {
            return format!("No events found for call {call_sid}");
        }

        let mut table = Self::base_table();
        table.set_titles(row![b -> "Event", b -> "Timestamp", b -> "Request", b -> "Response"]);
        for event in events {
            let request = event
                .request
                .as_ref()
                .and_then(|r| r.get("url"))
                .and_then(|u| u.as_str())
                .unwrap_or("-");
            let response = event
                .response
                .as_ref()
                .and_then(|r| r.get("status_code"))
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![
                event.name.as_deref().unwrap_or("unknown"),
                event.timestamp.as_deref().unwrap_or("-"),
                request,
                response
            ]);
        }
        format!("Events for call {call_sid}\n{table}")
    }

    fn format_message_detail(&self, detail: &MessageDetail) -> String {
        let mut table = Self::base_table();
        table.set_titles(row![b -> "Field", b -> "Value"]);

        table.add_row(row!["SID", detail.sid]);
        let optional = [
            ("Direction", &detail.direction),
            ("From", &detail.from),
            ("To", &detail.to),
            ("Date Sent", &detail.date_sent),
            ("Date Updated", &detail.date_updated),
            ("Status", &detail.status),
            ("Price", &detail.price),
            ("Price Unit", &detail.price_unit),
            ("Segments", &detail.num_segments),
            ("Media", &detail.num_media),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                table.add_row(row![label, value]);
            }
        }
        if let Some(code) = detail.error_code {
            table.add_row(row!["Error Code", code.to_string().red()]);
        }
        if let Some(message) = &detail.error_message {
            table.add_row(row!["Error Message", message.red()]);
        }

        let body = detail.body.as_deref().unwrap_or("");
        format!("{table}\nBody:\n{body}")
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JsonFormatter
    pub fn new() -> Self {
        Self
    }

    fn pretty(value: serde_json::Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_activity(
        &self,
        kind: ActivityKind,
        records: &[ActivityRecord],
        totals: &Totals,
        _tz: &Tz,
    ) -> String {
        Self::pretty(json!({
            "kind": kind,
            "records": records,
            "totals": totals,
        }))
    }

    fn format_numbers(&self, numbers: &[OwnedNumber]) -> String {
        Self::pretty(json!({ "numbers": numbers }))
    }

    fn format_inactive(
        &self,
        inactive: &[InactiveNumber],
        scanned: usize,
        threshold_days: u32,
        _tz: &Tz,
    ) -> String {
        Self::pretty(json!({
            "inactive": inactive,
            "scanned": scanned,
            "threshold_days": threshold_days,
        }))
    }

    fn format_number_config(&self, config: &NumberConfig) -> String {
        Self::pretty(json!({ "config": config }))
    }

    fn format_call_events(&self, call_sid: &str, events: &[CallEvent]) -> String {
        Self::pretty(json!({ "call_sid": call_sid, "events": events }))
    }

    fn format_message_detail(&self, detail: &MessageDetail) -> String {
        Self::pretty(json!({ "message": detail }))
    }
}

/// Get the formatter matching the output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter::new())
    } else {
        Box::new(TableFormatter::new())
    }
}
