//! # Dose Planner Core Library
//!
//! This library turns a dosing frequency into the concrete instants at which a
//! medication must be taken. It is a pure, synchronous computation over time
//! values: no I/O, no shared state, safe to call from any number of threads.
//!
//! ## Design Philosophy
//!
//! ### Validate, Then Generate
//! - **Frequency gate**: [`frequency::is_valid_frequency`] accepts intervals from 1 hour
//!   to 24 hours inclusive. Everything else is rejected before generation.
//! - **Total generator**: [`schedule::generate_schedule`] never fails. An empty result
//!   is a valid answer (e.g. `start > end`).
//!
//! ### Business Rules
//! Every generated taking satisfies:
//! - **Bounded**: lies within `[start, end]`
//! - **Daytime**: wall-clock hour between 08 and 21 inclusive
//! - **Quarter-hour grid**: minute is 0, 15, 30 or 45 and seconds are zero
//! - **Ordered**: strictly later than the taking before it
//!
//! ### Data Flow
//! 1. **Request**: frequency and course length arrive as text ([`plan::ScheduleRequest`])
//! 2. **Validate**: text is parsed and range checked ([`frequency`])
//! 3. **Generate**: takings are computed ([`schedule`])
//! 4. **Query**: upcoming takings are selected from a stored list ([`upcoming`])
//!
//! ## Core Types
//! - [`DosageTimestamp`]: a single taking, `DateTime<FixedOffset>`
//! - [`ScheduleWindow`]: the `(start, end, interval)` input of one generation run
//! - [`Frequency`]: an interval that passed the range check

pub mod config;
pub mod frequency;
pub mod plan;
pub mod schedule;
pub mod upcoming;

pub use frequency::{is_valid_frequency, Frequency};
pub use schedule::{generate_schedule, DayWindow, DosageTimestamp, ScheduleWindow};

#[cfg(test)]
mod tests;
