//! # Dosing Frequency
//!
//! A dosing frequency is the interval between two consecutive takings. Before any
//! schedule is generated the interval must fall inside the admissible range:
//!
//! - **Lower bound**: 1 hour (inclusive)
//! - **Upper bound**: 24 hours (inclusive)
//!
//! Zero, negative and sub-hour intervals are rejected, as is anything longer than a
//! day. The schedule generator relies on a positive interval to make progress, so
//! this check is the gate in front of it.
//!
//! The module also owns the compact text form used by requests and the CLI
//! (`6h`, `1h44m`, `30m`, `7d`).

use chrono::Duration;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Shortest admissible interval between two takings.
pub const MIN_FREQUENCY: Duration = Duration::hours(1);

/// Longest admissible interval between two takings.
pub const MAX_FREQUENCY: Duration = Duration::hours(24);

/// Errors produced while reading a duration from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Nothing but whitespace (or a lone sign) was supplied
    #[error("empty duration")]
    Empty,

    /// A number was not followed by a unit, e.g. `"90"` or `"1h30"`
    #[error("missing unit after '{0}' (expected d, h, m or s)")]
    MissingUnit(String),

    /// A unit was not preceded by a number, e.g. `"h"`
    #[error("missing number before unit '{0}'")]
    MissingNumber(char),

    /// A character other than a digit or a known unit
    #[error("unknown duration unit '{0}'")]
    UnknownUnit(char),

    /// The value does not fit into a chrono duration
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Errors produced when a duration is used as a dosing frequency.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrequencyError {
    /// The text could not be read as a duration at all
    #[error("invalid frequency: {0}")]
    Parse(#[from] DurationError),

    /// The duration is well formed but outside 1h..=24h
    #[error("frequency {0} is outside the allowed range of 1h to 24h")]
    OutOfRange(String),
}

/// Check whether `interval` is an admissible dosing frequency.
///
/// Valid iff `1h <= interval <= 24h`. Both bounds are inclusive.
///
/// # Example
/// ```
/// use chrono::Duration;
/// use dose_planner_lib::frequency::is_valid_frequency;
///
/// assert!(is_valid_frequency(Duration::hours(1)));
/// assert!(is_valid_frequency(Duration::hours(24)));
/// assert!(!is_valid_frequency(Duration::minutes(30)));
/// assert!(!is_valid_frequency(Duration::hours(25)));
/// ```
pub fn is_valid_frequency(interval: Duration) -> bool {
    interval >= MIN_FREQUENCY && interval <= MAX_FREQUENCY
}

/// Parse a compact duration string such as `"6h"`, `"1h44m"` or `"-30m"`.
///
/// The text is a sequence of `<digits><unit>` groups where unit is one of
/// `d` (days), `h` (hours), `m` (minutes) or `s` (seconds). Groups may repeat and
/// appear in any order; their values are summed. A single leading `-` negates the
/// whole duration. Surrounding whitespace is ignored.
///
/// Range checks are not done here; see [`is_valid_frequency`].
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if body.is_empty() {
        return Err(DurationError::Empty);
    }

    let overflow = || DurationError::Overflow(trimmed.to_string());
    let mut total_secs: i64 = 0;
    let mut digits = String::new();

    for ch in body.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let unit_secs: i64 = match ch {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(DurationError::UnknownUnit(ch)),
        };
        if digits.is_empty() {
            return Err(DurationError::MissingNumber(ch));
        }

        let value: i64 = digits.parse().map_err(|_| overflow())?;
        digits.clear();

        total_secs = value
            .checked_mul(unit_secs)
            .and_then(|secs| total_secs.checked_add(secs))
            .ok_or_else(overflow)?;
    }

    // Trailing digits with no unit
    if !digits.is_empty() {
        return Err(DurationError::MissingUnit(digits));
    }

    let secs = if negative { -total_secs } else { total_secs };
    Duration::try_seconds(secs).ok_or_else(overflow)
}

/// Render a duration in the compact form accepted by [`parse_duration`].
///
/// Sub-second precision is dropped. Zero renders as `"0s"`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    if total == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }

    let mut rest = total.unsigned_abs();
    for (unit, secs) in [('d', 86_400u64), ('h', 3_600), ('m', 60), ('s', 1)] {
        let value = rest / secs;
        if value > 0 {
            out.push_str(&value.to_string());
            out.push(unit);
            rest %= secs;
        }
    }
    out
}

/// A dosing interval that has passed [`is_valid_frequency`].
///
/// Holding a `Frequency` instead of a bare `Duration` means the range check cannot
/// be skipped on the way to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(Duration);

impl Frequency {
    /// The validated interval.
    pub fn interval(self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for Frequency {
    type Error = FrequencyError;

    fn try_from(interval: Duration) -> Result<Self, Self::Error> {
        if is_valid_frequency(interval) {
            Ok(Frequency(interval))
        } else {
            Err(FrequencyError::OutOfRange(format_duration(interval)))
        }
    }
}

impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::try_from(parse_duration(s)?)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
