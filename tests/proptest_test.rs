//! Property-based tests for result aggregation

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use twilens::aggregation::{combine, find_inactive};
use twilens_core::types::{
    ActivityKind, ActivityRecord, Direction, ISOTimestamp, OwnedNumber, RecordDetail, RecordSid,
};

fn record(id: u16, hour: u32) -> ActivityRecord {
    ActivityRecord {
        sid: RecordSid::new(format!("CA{id:04}")),
        kind: ActivityKind::Call,
        direction: Direction::Inbound,
        from: "+15550001111".to_string(),
        to: "+19193736940".to_string(),
        timestamp: ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 7, 2, hour, 0, 0).unwrap()),
        status: "completed".to_string(),
        detail: RecordDetail::Call { duration_secs: 10 },
    }
}

/// Small id and hour domains so duplicate SIDs and timestamp ties occur often
fn records_strategy() -> impl Strategy<Value = Vec<ActivityRecord>> {
    prop::collection::vec((0u16..20, 0u32..4), 0..30)
        .prop_map(|pairs| pairs.into_iter().map(|(id, hour)| record(id, hour)).collect())
}

proptest! {
    #[test]
    fn combine_output_has_unique_sids(a in records_strategy(), b in records_strategy()) {
        let blended = combine(a, b);
        let mut seen = HashSet::new();
        for record in &blended {
            prop_assert!(seen.insert(record.sid.clone()));
        }
    }

    #[test]
    fn combine_is_commutative(a in records_strategy(), b in records_strategy()) {
        // The tie-break on SID makes the ordering independent of argument order;
        // a record drawn with different hours in a and b counts as the same
        // identity, so compare SID sequences.
        let ab: Vec<_> = combine(a.clone(), b.clone()).into_iter().map(|r| r.sid).collect();
        let ba: Vec<_> = combine(b, a).into_iter().map(|r| r.sid).collect();
        prop_assert_eq!(
            ab.iter().collect::<HashSet<_>>(),
            ba.iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn combine_orders_descending_with_sid_tiebreak(a in records_strategy(), b in records_strategy()) {
        let blended = combine(a, b);
        for pair in blended.windows(2) {
            let newer = &pair[0];
            let older = &pair[1];
            prop_assert!(newer.timestamp >= older.timestamp);
            if newer.timestamp == older.timestamp {
                prop_assert!(newer.sid < older.sid);
            }
        }
    }

    #[test]
    fn combine_keeps_every_distinct_sid(a in records_strategy(), b in records_strategy()) {
        let expected: HashSet<RecordSid> = a.iter().chain(b.iter()).map(|r| r.sid.clone()).collect();
        let blended = combine(a, b);
        prop_assert_eq!(blended.len(), expected.len());
    }

    #[test]
    fn find_inactive_partitions_on_cutoff(ages in prop::collection::vec(prop::option::of(0i64..90), 0..20)) {
        let now = Utc.with_ymd_and_hms(2024, 7, 31, 12, 0, 0).unwrap();
        let threshold = 30u32;

        let numbers: Vec<OwnedNumber> = (0..ages.len())
            .map(|i| OwnedNumber {
                phone_number: format!("+1555000{i:04}"),
                friendly_name: "line".to_string(),
                sid: format!("PN{i}"),
            })
            .collect();
        let lookup = |n: &OwnedNumber| {
            let index: usize = n.sid[2..].parse().unwrap();
            ages[index].map(|days| ISOTimestamp::new(now - Duration::days(days)))
        };

        let inactive = find_inactive(&numbers, lookup, threshold, now);
        let flagged: HashSet<&str> = inactive.iter().map(|n| n.phone_number.as_str()).collect();

        for (i, age) in ages.iter().enumerate() {
            let should_flag = match age {
                None => true,
                Some(days) => *days > i64::from(threshold),
            };
            prop_assert_eq!(
                flagged.contains(numbers[i].phone_number.as_str()),
                should_flag
            );
        }
    }
}
