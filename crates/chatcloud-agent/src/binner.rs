use chatcloud_core::{Event, TimeBucket, Timestamp};
use chrono::{Duration, Timelike};
use std::collections::BTreeMap;

/// Rounds up to the next hour boundary; a time exactly on the hour stays put.
pub fn ceil_hour(t: Timestamp) -> Timestamp {
    let floor = t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t);
    if floor == t {
        t
    } else {
        floor + Duration::hours(1)
    }
}

/// Hourly event counts, ascending. Empty hours are not synthesized.
pub fn bins(events: &[Event]) -> Vec<TimeBucket> {
    let mut counts: BTreeMap<Timestamp, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(ceil_hour(event.time)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(start, count)| TimeBucket { start, count })
        .collect()
}
