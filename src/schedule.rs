//! # Dosage Schedule Generation
//!
//! Turns a `(start, end, interval)` triple into the concrete instants at which a
//! dose must be taken. The naive recurrence `start + k * interval` is bent by two
//! business rules:
//!
//! - **Quarter-hour grid**: takings land on `:00`, `:15`, `:30` or `:45` with zero
//!   seconds. Off-grid candidates are rounded *up* to the next boundary.
//! - **Daytime window**: takings happen between 08:00 and 21:59 wall-clock time.
//!   Early-morning candidates move to 08:00 of the same day; late-evening
//!   candidates move to 08:00 of the next day.
//!
//! ## Algorithm
//!
//! Single pass, no backtracking. For each candidate:
//! 1. Snap to the grid (may roll the hour or the day forward)
//! 2. Clamp into the daytime window
//! 3. Stop if the adjusted instant is after `end`
//! 4. Emit it, then advance the *adjusted* instant by `interval`
//!
//! Snapping happens before clamping because a snap can cross a window edge:
//! 21:55 snaps to 22:00 which must then move to 08:00 next day.
//!
//! Advancing from the adjusted instant means long intervals keep landing on the
//! window opening once the clamp engages. With a 17h interval started at 09:00,
//! 08:00 + 17h = 01:00 which clamps back to 08:00 of that new day, every day.
//!
//! ## Time Zones
//!
//! Hour and minute checks use the wall-clock fields of the caller's fixed offset.
//! A fixed offset has no DST transitions, so "08:00 of that day" is always a single
//! well-defined instant.

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use std::iter::FusedIterator;
use thiserror::Error;

/// A single scheduled taking: an instant on the grid and inside the daytime window.
pub type DosageTimestamp = DateTime<FixedOffset>;

/// Errors raised when building a [`DayWindow`] from untrusted values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Hours must satisfy `first_hour <= last_hour <= 23`
    #[error("invalid daytime window: first hour {first_hour}, last hour {last_hour}")]
    Hours { first_hour: u32, last_hour: u32 },

    /// The grid step must divide an hour evenly
    #[error("grid step of {0} minutes does not divide an hour")]
    Grid(u32),
}

/// Wall-clock limits applied to every taking.
///
/// A taking may happen at any grid boundary from `first_hour:00` up to
/// `last_hour:59`. The hour check is inclusive on both ends, so with the default
/// window 21:45 is a valid taking while 22:00 is not.
///
/// Fields are private: [`DayWindow::new`] is the only way to build a window other
/// than the default, so every window in use has passed its checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayWindow {
    first_hour: u32,
    last_hour: u32,
    grid_minutes: u32,
}

impl Default for DayWindow {
    fn default() -> Self {
        DayWindow {
            first_hour: 8,
            last_hour: 21,
            grid_minutes: 15,
        }
    }
}

impl DayWindow {
    /// Build a window, rejecting hour ranges that wrap past midnight and grid steps
    /// that do not tile an hour.
    pub fn new(first_hour: u32, last_hour: u32, grid_minutes: u32) -> Result<Self, WindowError> {
        if first_hour > last_hour || last_hour > 23 {
            return Err(WindowError::Hours {
                first_hour,
                last_hour,
            });
        }
        if grid_minutes == 0 || grid_minutes > 60 || 60 % grid_minutes != 0 {
            return Err(WindowError::Grid(grid_minutes));
        }

        Ok(DayWindow {
            first_hour,
            last_hour,
            grid_minutes,
        })
    }

    /// Hour of day at which the window opens (takings are clamped to `HH:00`)
    pub fn first_hour(&self) -> u32 {
        self.first_hour
    }

    /// Last hour of day in which a taking is still allowed
    pub fn last_hour(&self) -> u32 {
        self.last_hour
    }

    /// Grid step in minutes
    pub fn grid_minutes(&self) -> u32 {
        self.grid_minutes
    }

    /// Apply grid snapping then the window clamp to a raw candidate.
    ///
    /// Returns `None` only when the adjustment would leave chrono's representable
    /// range.
    pub fn adjust(&self, candidate: DosageTimestamp) -> Option<DosageTimestamp> {
        let snapped = snap_to_grid(candidate, self.grid_minutes)?;

        if snapped.hour() < self.first_hour {
            // Already past midnight: stay on the day we reached
            clamp_into_window(snapped, self.first_hour, 0)
        } else if snapped.hour() > self.last_hour {
            clamp_into_window(snapped, self.first_hour, 1)
        } else {
            Some(snapped)
        }
    }
}

/// Round `t` up to the next multiple of `grid_minutes` past the hour.
///
/// Instants already exactly on a boundary are returned unchanged. Anything else,
/// including an on-grid minute with leftover seconds, moves forward to the next
/// boundary with seconds and sub-seconds cleared, so the result is never earlier
/// than `t`. A zero grid is treated as a one-minute grid.
pub fn snap_to_grid(t: DosageTimestamp, grid_minutes: u32) -> Option<DosageTimestamp> {
    let grid_minutes = grid_minutes.max(1);
    let into_slot = Duration::minutes(i64::from(t.minute() % grid_minutes))
        + Duration::seconds(i64::from(t.second()))
        + Duration::nanoseconds(i64::from(t.nanosecond()));

    if into_slot.is_zero() {
        return Some(t);
    }

    t.checked_sub_signed(into_slot)?
        .checked_add_signed(Duration::minutes(i64::from(grid_minutes)))
}

/// Move `t` to `hour:00:00` wall-clock time, `day_offset` days after `t`'s date.
///
/// One helper serves both sides of the window: `day_offset = 0` for the early
/// clamp, `1` for the late clamp.
pub fn clamp_into_window(
    t: DosageTimestamp,
    hour: u32,
    day_offset: i64,
) -> Option<DosageTimestamp> {
    let since_midnight = Duration::seconds(i64::from(t.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(t.nanosecond()));

    t.checked_sub_signed(since_midnight)?
        .checked_add_signed(Duration::hours(i64::from(hour)) + Duration::days(day_offset))
}

/// The immutable input of one generation run.
///
/// `ScheduleWindow` is `Copy` and holds no iteration state, so [`takings`] can be
/// called any number of times and always yields the same sequence.
///
/// [`takings`]: ScheduleWindow::takings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleWindow {
    /// First candidate instant
    pub start: DosageTimestamp,
    /// No taking is ever scheduled after this instant
    pub end: DosageTimestamp,
    /// Distance between consecutive candidates; expected to be positive
    pub interval: Duration,
    /// Wall-clock limits for every taking
    pub day: DayWindow,
}

impl ScheduleWindow {
    /// A window using the default 08:00-21:59 daytime limits and 15-minute grid.
    pub fn new(start: DosageTimestamp, end: DosageTimestamp, interval: Duration) -> Self {
        ScheduleWindow {
            start,
            end,
            interval,
            day: DayWindow::default(),
        }
    }

    /// Replace the daytime limits.
    pub fn with_day_window(mut self, day: DayWindow) -> Self {
        self.day = day;
        self
    }

    /// Lazily walk the takings of this window in chronological order.
    pub fn takings(&self) -> Takings {
        Takings {
            next: Some(self.start),
            end: self.end,
            interval: self.interval,
            day: self.day,
        }
    }
}

/// Iterator over the takings of a [`ScheduleWindow`].
///
/// Every item satisfies the grid and window rules and lies in `[start, end]`.
/// Items are strictly increasing. The iterator also ends when the next candidate
/// would not be strictly later than the last taking (a non-positive interval) or
/// would leave chrono's representable range.
#[derive(Clone, Debug)]
pub struct Takings {
    next: Option<DosageTimestamp>,
    end: DosageTimestamp,
    interval: Duration,
    day: DayWindow,
}

impl Iterator for Takings {
    type Item = DosageTimestamp;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.next.take()?;
        if candidate > self.end {
            return None;
        }

        let taking = self.day.adjust(candidate)?;
        if taking > self.end {
            return None;
        }

        self.next = taking
            .checked_add_signed(self.interval)
            .filter(|next| *next > taking);

        Some(taking)
    }
}

impl FusedIterator for Takings {}

/// Generate all takings between `start` and `end` for the given `interval`.
///
/// Uses the default daytime window. Returns an empty list when `start > end`.
/// `interval` should already have passed
/// [`is_valid_frequency`](crate::frequency::is_valid_frequency).
///
/// # Example
/// ```
/// use chrono::{Duration, FixedOffset, TimeZone};
/// use dose_planner_lib::schedule::generate_schedule;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let start = utc.with_ymd_and_hms(2025, 3, 5, 22, 0, 0).unwrap();
/// let end = utc.with_ymd_and_hms(2025, 3, 6, 9, 0, 0).unwrap();
///
/// let takings = generate_schedule(start, end, Duration::hours(1));
/// assert_eq!(
///     takings,
///     vec![
///         utc.with_ymd_and_hms(2025, 3, 6, 8, 0, 0).unwrap(),
///         utc.with_ymd_and_hms(2025, 3, 6, 9, 0, 0).unwrap(),
///     ]
/// );
/// ```
pub fn generate_schedule(
    start: DosageTimestamp,
    end: DosageTimestamp,
    interval: Duration,
) -> Vec<DosageTimestamp> {
    collect_takings(&ScheduleWindow::new(start, end, interval))
}

/// Eagerly collect the takings of `window`, logging a short summary.
pub fn collect_takings(window: &ScheduleWindow) -> Vec<DosageTimestamp> {
    let takings: Vec<_> = window.takings().collect();

    tracing::debug!(
        start = %window.start,
        end = %window.end,
        interval_secs = window.interval.num_seconds(),
        count = takings.len(),
        first = ?takings.first(),
        last = ?takings.last(),
        "generated dosage schedule"
    );

    takings
}
