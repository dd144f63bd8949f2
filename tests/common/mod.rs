//! Shared helpers for integration tests

use twilens_core::types::{
    Account, AccountSid, ActivityKind, ActivityRecord, AuthToken, Direction, ISOTimestamp,
    RecordDetail, RecordSid,
};

/// Fixed test account SID
pub fn test_sid() -> String {
    format!("AC{}", "0".repeat(32))
}

/// Credentials accepted by the mock server
pub fn test_account() -> Account {
    Account::new(
        "test",
        AccountSid::new(test_sid()),
        AuthToken::new("0123456789abcdef0123456789abcdef"),
    )
}

/// Resource path under the test account
pub fn account_path(resource: &str) -> String {
    format!("/2010-04-01/Accounts/{}/{resource}", test_sid())
}

/// JSON for one call record starting at the given hour on a fixed day
pub fn call_json(sid: &str, hour: u32) -> String {
    format!(
        r#"{{
            "sid": "{sid}",
            "direction": "inbound",
            "from": "+15550001111",
            "to": "+19193736940",
            "start_time": "Tue, 02 Jul 2024 {hour:02}:00:00 +0000",
            "duration": "42",
            "status": "completed"
        }}"#
    )
}

/// JSON page envelope for call records
pub fn calls_page(records: &[String], next_page_uri: Option<&str>) -> String {
    let next = match next_page_uri {
        Some(uri) => format!(r#", "next_page_uri": "{uri}""#),
        None => String::new(),
    };
    format!(r#"{{"calls": [{}]{next}}}"#, records.join(","))
}

/// In-memory call record with the given SID and hour, for aggregation tests
pub fn call_record(sid: &str, hour: u32) -> ActivityRecord {
    use chrono::TimeZone;
    ActivityRecord {
        sid: RecordSid::new(sid),
        kind: ActivityKind::Call,
        direction: Direction::Inbound,
        from: "+15550001111".to_string(),
        to: "+19193736940".to_string(),
        timestamp: ISOTimestamp::new(
            chrono::Utc
                .with_ymd_and_hms(2024, 7, 2, hour, 0, 0)
                .unwrap(),
        ),
        status: "completed".to_string(),
        detail: RecordDetail::Call { duration_secs: 42 },
    }
}
