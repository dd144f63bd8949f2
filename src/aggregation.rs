//! Aggregation of fetched activity results
//!
//! Search queries come back as two directional result sets per number; this
//! module blends them into one deduplicated, time-ordered view and derives
//! the inactive-number report. Everything here is pure: aggregation is
//! recomputed per query and never persisted.
//!
//! # Examples
//!
//! ```
//! use twilens::aggregation::combine;
//!
//! let blended = combine(Vec::new(), Vec::new());
//! assert!(blended.is_empty());
//! ```

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use twilens_core::types::{ActivityRecord, ISOTimestamp, InactiveNumber, OwnedNumber};

/// Blend both directional result sets for one queried number
///
/// The union is deduplicated by record SID (a call where the number appears
/// as both endpoints shows up in both sets and is kept once), then sorted by
/// timestamp descending. Ties are broken by SID ascending so the ordering is
/// deterministic; the result is independent of argument order.
pub fn combine(to: Vec<ActivityRecord>, from: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    let mut seen = HashSet::new();
    let mut blended: Vec<ActivityRecord> = to
        .into_iter()
        .chain(from)
        .filter(|record| seen.insert(record.sid.clone()))
        .collect();

    blended.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.sid.cmp(&b.sid))
    });
    blended
}

/// Find numbers with no recent activity
///
/// A number is inactive when the lookup reports no activity at all, or its
/// most recent activity is older than `now - threshold_days`. Each flagged
/// number is paired with its last-activity timestamp (None meaning never).
pub fn find_inactive<F>(
    numbers: &[OwnedNumber],
    mut last_activity: F,
    threshold_days: u32,
    now: DateTime<Utc>,
) -> Vec<InactiveNumber>
where
    F: FnMut(&OwnedNumber) -> Option<ISOTimestamp>,
{
    let cutoff = now - Duration::days(i64::from(threshold_days));

    numbers
        .iter()
        .filter_map(|number| {
            let last = last_activity(number);
            match last {
                Some(ts) if *ts.inner() >= cutoff => None,
                _ => Some(InactiveNumber {
                    phone_number: number.phone_number.clone(),
                    friendly_name: number.friendly_name.clone(),
                    last_activity: last,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use twilens_core::types::{ActivityKind, Direction, RecordDetail, RecordSid};

    fn record(sid: &str, hour: u32) -> ActivityRecord {
        ActivityRecord {
            sid: RecordSid::new(sid),
            kind: ActivityKind::Call,
            direction: Direction::Inbound,
            from: "+15550001111".to_string(),
            to: "+19193736940".to_string(),
            timestamp: ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 7, 2, hour, 0, 0).unwrap()),
            status: "completed".to_string(),
            detail: RecordDetail::Call { duration_secs: 10 },
        }
    }

    fn owned(number: &str, sid: &str) -> OwnedNumber {
        OwnedNumber {
            phone_number: number.to_string(),
            friendly_name: "line".to_string(),
            sid: sid.to_string(),
        }
    }

    #[test]
    fn test_combine_orders_newest_first() {
        let blended = combine(
            vec![record("CA1", 8), record("CA2", 12)],
            vec![record("CA3", 10)],
        );
        let sids: Vec<&str> = blended.iter().map(|r| r.sid.as_str()).collect();
        assert_eq!(sids, vec!["CA2", "CA3", "CA1"]);
    }

    #[test]
    fn test_combine_deduplicates_by_sid() {
        // The same record fetched through both directional queries
        let blended = combine(
            vec![record("CA1", 8), record("CA2", 9)],
            vec![record("CA1", 8)],
        );
        assert_eq!(blended.len(), 2);
    }

    #[test]
    fn test_combine_ties_broken_by_sid() {
        let blended = combine(vec![record("CA9", 8)], vec![record("CA1", 8)]);
        let sids: Vec<&str> = blended.iter().map(|r| r.sid.as_str()).collect();
        assert_eq!(sids, vec!["CA1", "CA9"]);
    }

    #[test]
    fn test_combine_commutative() {
        let a = vec![record("CA1", 8), record("CA2", 9)];
        let b = vec![record("CA2", 9), record("CA3", 10)];
        assert_eq!(combine(a.clone(), b.clone()), combine(b, a));
    }

    #[test]
    fn test_find_inactive_threshold_boundaries() {
        let now = Utc.with_ymd_and_hms(2024, 7, 31, 12, 0, 0).unwrap();
        let numbers = vec![
            owned("+15550000001", "PN1"),
            owned("+15550000002", "PN2"),
            owned("+15550000003", "PN3"),
        ];
        let activity = |n: &OwnedNumber| match n.sid.as_str() {
            // 31 days before now: inactive
            "PN1" => Some(ISOTimestamp::new(now - Duration::days(31))),
            // 29 days before now: active
            "PN2" => Some(ISOTimestamp::new(now - Duration::days(29))),
            // No activity ever
            _ => None,
        };

        let inactive = find_inactive(&numbers, activity, 30, now);
        assert_eq!(inactive.len(), 2);

        assert_eq!(inactive[0].phone_number, "+15550000001");
        assert_eq!(
            inactive[0].last_activity,
            Some(ISOTimestamp::new(now - Duration::days(31)))
        );

        assert_eq!(inactive[1].phone_number, "+15550000003");
        assert_eq!(inactive[1].last_activity, None);
    }

    #[test]
    fn test_find_inactive_empty_number_list() {
        let now = Utc.with_ymd_and_hms(2024, 7, 31, 12, 0, 0).unwrap();
        assert!(find_inactive(&[], |_| None, 30, now).is_empty());
    }
}
