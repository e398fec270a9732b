//! Read-side queries over an already generated schedule.
//!
//! All functions take the takings in chronological order, as produced by
//! [`generate_schedule`](crate::schedule::generate_schedule), and return borrowed
//! results in the same order.

use crate::schedule::DosageTimestamp;
use chrono::Duration;

/// The first taking at or after `now`.
pub fn next_taking(takings: &[DosageTimestamp], now: DosageTimestamp) -> Option<DosageTimestamp> {
    let idx = takings.partition_point(|t| *t < now);
    takings.get(idx).copied()
}

/// Takings inside `[now, now + period]`.
///
/// A period that would overflow chrono's range is treated as unbounded.
pub fn next_takings(
    takings: &[DosageTimestamp],
    now: DosageTimestamp,
    period: Duration,
) -> &[DosageTimestamp] {
    let from = takings.partition_point(|t| *t < now);
    let to = match now.checked_add_signed(period) {
        Some(until) => takings.partition_point(|t| *t <= until),
        None => takings.len(),
    };

    // A negative period puts `until` before `now`
    &takings[from..to.max(from)]
}

/// Takings still ahead of `now` on `now`'s calendar day.
///
/// The day is taken in `now`'s own offset.
pub fn remaining_today(takings: &[DosageTimestamp], now: DosageTimestamp) -> Vec<DosageTimestamp> {
    let today = now.date_naive();
    let from = takings.partition_point(|t| *t < now);

    takings[from..]
        .iter()
        .map(|t| t.with_timezone(&now.timezone()))
        .take_while(|t| t.date_naive() == today)
        .collect()
}
