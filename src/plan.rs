//! # Schedule Planning
//!
//! Glue between an incoming schedule request and the generator. A request names a
//! frequency and an optional course duration as text; the planner parses and
//! validates both, fills in the configured default duration, and returns the full
//! list of takings together with the resolved window.
//!
//! ## Pipeline
//! 1. **Parse** the frequency text and reject anything outside 1h..=24h
//! 2. **Resolve** the course duration (request value or configured default)
//! 3. **Generate** takings from `start` to `start + duration`
//!
//! Storing the result is left to the caller.

use crate::config::{Config, ConfigError};
use crate::frequency::{
    format_duration, parse_duration, DurationError, Frequency, FrequencyError,
};
use crate::schedule::{collect_takings, DayWindow, DosageTimestamp, ScheduleWindow};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that reject a schedule request before any taking is generated.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The frequency is malformed or out of range
    #[error(transparent)]
    Frequency(#[from] FrequencyError),

    /// The course duration is malformed
    #[error("invalid duration: {0}")]
    Duration(#[from] DurationError),

    /// The course duration is zero or negative
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(String),

    /// `start + duration` leaves the representable time range
    #[error("course end is out of range")]
    EndOutOfRange,
}

/// A request to schedule a medication for a user.
///
/// # Example
/// ```
/// use dose_planner_lib::plan::ScheduleRequest;
///
/// let request: ScheduleRequest = serde_json::from_str(
///     r#"{"user_id": 1, "medication_id": 7, "frequency": "6h"}"#,
/// )
/// .unwrap();
/// assert_eq!(request.duration, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub user_id: i64,
    pub medication_id: i64,
    /// Interval between takings, e.g. "6h"
    pub frequency: String,
    /// Course length, e.g. "7d"; the configured default applies when absent or empty
    #[serde(default)]
    pub duration: Option<String>,
}

/// A fully resolved schedule ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub user_id: i64,
    pub medication_id: i64,
    pub start: DosageTimestamp,
    pub end: DosageTimestamp,
    pub frequency: Frequency,
    pub takings: Vec<DosageTimestamp>,
}

/// Turns [`ScheduleRequest`]s into [`Plan`]s using configured defaults.
#[derive(Clone, Debug)]
pub struct Planner {
    default_duration: Duration,
    day: DayWindow,
}

impl Planner {
    /// Build a planner, validating the configured defaults up front.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Planner {
            default_duration: config.default_duration()?,
            day: config.day_window()?,
        })
    }

    /// Resolve `request` into a plan whose course begins at `start`.
    pub fn plan(
        &self,
        request: &ScheduleRequest,
        start: DosageTimestamp,
    ) -> Result<Plan, PlanError> {
        let frequency: Frequency = request.frequency.parse()?;

        let duration = match request.duration.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => parse_duration(text)?,
            _ => self.default_duration,
        };
        if duration <= Duration::zero() {
            return Err(PlanError::NonPositiveDuration(format_duration(duration)));
        }

        let end = start
            .checked_add_signed(duration)
            .ok_or(PlanError::EndOutOfRange)?;

        let window =
            ScheduleWindow::new(start, end, frequency.interval()).with_day_window(self.day);
        let takings = collect_takings(&window);

        tracing::info!(
            user_id = request.user_id,
            medication_id = request.medication_id,
            frequency = %frequency,
            takings = takings.len(),
            "planned schedule"
        );

        Ok(Plan {
            user_id: request.user_id,
            medication_id: request.medication_id,
            start,
            end,
            frequency,
            takings,
        })
    }
}

impl Default for Planner {
    fn default() -> Self {
        Planner {
            default_duration: Duration::days(7),
            day: DayWindow::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn utc(d: u32, h: u32, min: u32) -> DosageTimestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, d, h, min, 0)
            .unwrap()
    }

    fn request(frequency: &str, duration: Option<&str>) -> ScheduleRequest {
        ScheduleRequest {
            user_id: 42,
            medication_id: 7,
            frequency: frequency.to_string(),
            duration: duration.map(str::to_string),
        }
    }

    #[test]
    fn test_plan_with_explicit_duration() {
        let planner = Planner::default();
        let plan = planner
            .plan(&request("6h", Some("44h20m")), utc(5, 17, 7))
            .unwrap();

        assert_eq!(plan.end, utc(7, 13, 27));
        assert_eq!(plan.frequency.interval(), Duration::hours(6));
        assert_eq!(
            plan.takings,
            vec![
                utc(5, 17, 15),
                utc(6, 8, 0),
                utc(6, 14, 0),
                utc(6, 20, 0),
                utc(7, 8, 0),
            ]
        );
    }

    #[test]
    fn test_missing_or_empty_duration_uses_default() {
        let planner = Planner::new(&Config::default()).unwrap();

        let plan = planner.plan(&request("24h", None), utc(5, 9, 0)).unwrap();
        assert_eq!(plan.end, utc(12, 9, 0));
        assert_eq!(plan.takings.len(), 8);

        let plan = planner.plan(&request("24h", Some("  ")), utc(5, 9, 0)).unwrap();
        assert_eq!(plan.end, utc(12, 9, 0));
    }

    #[test]
    fn test_rejects_bad_frequency() {
        let planner = Planner::default();
        assert!(matches!(
            planner.plan(&request("30m", None), utc(5, 9, 0)),
            Err(PlanError::Frequency(FrequencyError::OutOfRange(_)))
        ));
        assert!(matches!(
            planner.plan(&request("often", None), utc(5, 9, 0)),
            Err(PlanError::Frequency(FrequencyError::Parse(_)))
        ));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let planner = Planner::default();
        assert!(matches!(
            planner.plan(&request("6h", Some("two weeks")), utc(5, 9, 0)),
            Err(PlanError::Duration(_))
        ));
        assert!(matches!(
            planner.plan(&request("6h", Some("-1d")), utc(5, 9, 0)),
            Err(PlanError::NonPositiveDuration(_))
        ));
        assert!(matches!(
            planner.plan(&request("6h", Some("0h")), utc(5, 9, 0)),
            Err(PlanError::NonPositiveDuration(_))
        ));
    }

    #[test]
    fn test_configured_window_is_applied() {
        let mut config = Config::default();
        config.window.first_hour = 10;
        config.window.last_hour = 18;
        let planner = Planner::new(&config).unwrap();

        let plan = planner.plan(&request("12h", Some("2d")), utc(5, 9, 0)).unwrap();
        // 09:00 opens late at 10:00, 22:00 moves to the next morning
        assert_eq!(plan.takings, vec![utc(5, 10, 0), utc(6, 10, 0)]);
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let plan = Planner::default()
            .plan(&request("12h", Some("12h")), utc(5, 9, 0))
            .unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["user_id"], 42);
        assert_eq!(json["frequency"], "12h");
        // A zero offset is written with the `Z` suffix
        assert_eq!(json["takings"][0], "2025-03-05T09:00:00Z");
        assert_eq!(json["takings"][1], "2025-03-05T21:00:00Z");
        assert_eq!(json["takings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_plan_json_keeps_caller_offset() {
        let berlin = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = berlin.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();

        let plan = Planner::default()
            .plan(&request("12h", Some("12h")), start)
            .unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["start"], "2025-03-05T09:00:00+02:00");
        assert_eq!(json["takings"][1], "2025-03-05T21:00:00+02:00");
    }
}
