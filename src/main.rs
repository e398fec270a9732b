//! # Dose Planner Entry Point
//!
//! Command-line front end for the planner: reads a frequency and course length,
//! generates the takings and prints them one per line (RFC 3339) or as JSON.
//!
//! ```text
//! dose-planner --frequency 6h --duration 48h --start 2025-03-05T17:07:00+00:00
//! ```

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};
use clap::Parser;
use dose_planner_lib::{
    config::Config,
    frequency::parse_duration,
    plan::{Planner, ScheduleRequest},
    upcoming,
};
use std::path::PathBuf;

/// Generate medication taking times for a dosing frequency.
#[derive(Parser, Debug)]
#[command(name = "dose-planner", version, about)]
struct CliArgs {
    /// Interval between takings, 1h to 24h (e.g. "6h", "1h30m")
    #[arg(long, short)]
    frequency: String,

    /// Course length (e.g. "7d"); defaults to the configured value
    #[arg(long, short)]
    duration: Option<String>,

    /// Course start as RFC 3339; defaults to now in the local offset
    #[arg(long)]
    start: Option<String>,

    /// Only print takings between now and now + PERIOD (e.g. "24h")
    #[arg(long, value_name = "PERIOD")]
    within: Option<String>,

    /// User the schedule belongs to (echoed in JSON output)
    #[arg(long, default_value_t = 0)]
    user_id: i64,

    /// Medication being scheduled (echoed in JSON output)
    #[arg(long, default_value_t = 0)]
    medication_id: i64,

    /// Path to config file (default: ./dose-planner.toml)
    #[arg(long, env = "DOSE_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the whole plan as JSON
    #[arg(long)]
    json: bool,
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let planner = Planner::new(&config).context("unusable configuration")?;

    let now: DateTime<FixedOffset> = Local::now().fixed_offset();
    let start = match &args.start {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid start time '{text}'"))?,
        None => now,
    };

    let request = ScheduleRequest {
        user_id: args.user_id,
        medication_id: args.medication_id,
        frequency: args.frequency,
        duration: args.duration,
    };
    let mut plan = planner
        .plan(&request, start)
        .context("schedule request rejected")?;

    if let Some(period) = &args.within {
        let period = parse_duration(period).with_context(|| format!("invalid period '{period}'"))?;
        plan.takings = upcoming::next_takings(&plan.takings, now, period).to_vec();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        for taking in &plan.takings {
            println!("{}", taking.to_rfc3339());
        }
    }

    Ok(())
}
