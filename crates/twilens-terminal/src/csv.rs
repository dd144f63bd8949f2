//! CSV serialization for fetched results
//!
//! Writes a header row matching the displayed columns and one row per
//! record, quoting fields per RFC 4180: a field containing a comma, a
//! double quote, or a line break is wrapped in quotes with embedded quotes
//! doubled.

use crate::output::{activity_columns, format_timestamp};
use chrono_tz::Tz;
use twilens_core::types::{ActivityKind, ActivityRecord, InactiveNumber, OwnedNumber, RecordDetail};

/// Quote a single field per RFC 4180 when it needs quoting
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row(out: &mut String, fields: &[&str]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&escaped.join(","));
    out.push_str("\r\n");
}

/// Serialize a blended activity result set
pub fn activity_csv(kind: ActivityKind, records: &[ActivityRecord], tz: &Tz) -> String {
    let mut out = String::new();
    write_row(&mut out, &activity_columns(kind));

    for record in records {
        let detail = match &record.detail {
            RecordDetail::Call { duration_secs } => duration_secs.to_string(),
            RecordDetail::Message { body_preview, .. } => body_preview.clone(),
        };
        let timestamp = format_timestamp(&record.timestamp, tz);
        let direction = record.direction.to_string();
        write_row(
            &mut out,
            &[
                &direction,
                &record.from,
                &record.to,
                &timestamp,
                &detail,
                &record.status,
                record.sid.as_str(),
            ],
        );
    }
    out
}

/// Serialize an inactive-number report
pub fn inactive_csv(inactive: &[InactiveNumber], tz: &Tz) -> String {
    let mut out = String::new();
    write_row(&mut out, &["Phone Number", "Friendly Name", "Last Activity"]);

    for entry in inactive {
        let last = match &entry.last_activity {
            Some(ts) => format_timestamp(ts, tz),
            None => "never".to_string(),
        };
        write_row(
            &mut out,
            &[&entry.phone_number, &entry.friendly_name, &last],
        );
    }
    out
}

/// Serialize the owned-number list
pub fn numbers_csv(numbers: &[OwnedNumber]) -> String {
    let mut out = String::new();
    write_row(&mut out, &["Phone Number", "Friendly Name", "SID"]);
    for number in numbers {
        write_row(
            &mut out,
            &[&number.phone_number, &number.friendly_name, &number.sid],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use twilens_core::types::{Direction, ISOTimestamp, RecordSid};

    #[test]
    fn test_plain_field_unquoted() {
        assert_eq!(escape_field("+19193736940"), "+19193736940");
    }

    #[test]
    fn test_comma_field_quoted() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_quote_field_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_newline_field_quoted() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_message_csv_shape() {
        let records = vec![ActivityRecord {
            sid: RecordSid::new("SM1"),
            kind: ActivityKind::Message,
            direction: Direction::Outbound,
            from: "+19193736940".to_string(),
            to: "+15550001111".to_string(),
            timestamp: ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 7, 2, 14, 30, 5).unwrap()),
            status: "delivered".to_string(),
            detail: RecordDetail::Message {
                body_preview: "totals, by month".to_string(),
                error_code: None,
                error_message: None,
            },
        }];

        let csv = activity_csv(ActivityKind::Message, &records, &Tz::UTC);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Direction,From,To,Date Sent,Message,Status,SID"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Outbound,+19193736940,+15550001111,2024-07-02 14:30:05,\"totals, by month\",delivered,SM1"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_inactive_csv_never() {
        let inactive = vec![InactiveNumber {
            phone_number: "+19193736940".to_string(),
            friendly_name: "front desk".to_string(),
            last_activity: None,
        }];
        let csv = inactive_csv(&inactive, &Tz::UTC);
        assert!(csv.contains("Phone Number,Friendly Name,Last Activity"));
        assert!(csv.contains("+19193736940,front desk,never"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Quoted fields always balance their quotes and preserve content
            #[test]
            fn escape_round_trips(field in ".*") {
                let escaped = escape_field(&field);
                let recovered = if escaped.starts_with('"') && escaped.ends_with('"') && escaped.len() >= 2 {
                    escaped[1..escaped.len() - 1].replace("\"\"", "\"")
                } else {
                    escaped.clone()
                };
                prop_assert_eq!(recovered, field);
            }

            /// Escaped output never leaves a bare quote inside an unquoted field
            #[test]
            fn unquoted_output_has_no_specials(field in "[^,\"\r\n]*") {
                prop_assert_eq!(escape_field(&field), field);
            }
        }
    }
}
