//! Usage statistics across every session of every project.
//!
//! Each session file is tallied on its own rayon task and the tallies are merged in
//! project order. A session that cannot be read is logged and left out of every total.
//! Messages are user and assistant records, tool-only turns included, so the counts here
//! can exceed the displayable message counts reported by session listing.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use rayon::prelude::*;
use serde_json::Value;

use crate::discovery::discover_projects;
use crate::models::{DailyStats, DashboardStats, HourlyActivity, ProjectStats};
use crate::parsers::deserializers::deserialize_timestamp;
use crate::parsers::{for_each_record, record_tokens};

/// US dollars per million input tokens
pub const INPUT_COST_PER_MILLION: f64 = 3.0;

/// US dollars per million output tokens
pub const OUTPUT_COST_PER_MILLION: f64 = 15.0;

/// Totals of a single session file
#[derive(Debug, Default)]
struct SessionTally {
    input_tokens: u64,
    output_tokens: u64,
    messages: u32,
    daily: BTreeMap<String, DailyStats>,
    hourly: HashMap<(u8, u8), u32>,
    first: Option<DateTime<FixedOffset>>,
    last: Option<DateTime<FixedOffset>>,
}

impl SessionTally {
    fn record(&mut self, value: &Value) {
        let timestamp = value.get("timestamp").and_then(|t| deserialize_timestamp(t).ok()?);
        let date = timestamp.as_deref().and_then(date_of);
        let instant = timestamp.as_deref().and_then(|t| DateTime::parse_from_rfc3339(t).ok());
        let is_message =
            matches!(value.get("type").and_then(Value::as_str), Some("user" | "assistant"));

        if is_message {
            self.messages += 1;
            if let Some(date) = date {
                self.day(date).message_count += 1;
            }
            if let Some(dt) = instant {
                let cell = (dt.weekday().num_days_from_monday() as u8, dt.hour() as u8);
                *self.hourly.entry(cell).or_default() += 1;
                self.first = Some(self.first.map_or(dt, |first| first.min(dt)));
                self.last = Some(self.last.map_or(dt, |last| last.max(dt)));
            }
        }

        if let Some((input, output)) = record_tokens(value) {
            self.input_tokens += input;
            self.output_tokens += output;
            if let Some(date) = date {
                let day = self.day(date);
                day.input_tokens += input;
                day.output_tokens += output;
            }
        }
    }

    fn day(&mut self, date: &str) -> &mut DailyStats {
        self.daily
            .entry(date.to_string())
            .or_insert_with(|| DailyStats { date: date.to_string(), ..DailyStats::default() })
    }

    /// Seconds between the first and last message, if positive
    fn duration_secs(&self) -> Option<i64> {
        let secs = (self.last? - self.first?).num_seconds();
        (secs > 0).then_some(secs)
    }
}

/// Date part (`YYYY-MM-DD`) of an RFC3339-like timestamp
fn date_of(timestamp: &str) -> Option<&str> {
    let date = timestamp.split('T').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok().then_some(date)
}

struct SessionTarget<'a> {
    project: usize,
    path: &'a Path,
}

/// Aggregate token usage, message counts and activity over every session
///
/// A missing data directory yields all-zero statistics.
///
/// # Errors
///
/// Returns an error only when project discovery fails (see [`discover_projects`]).
pub fn dashboard_stats(claude_dir: &Path, max_file_bytes: u64) -> Result<DashboardStats> {
    let projects = discover_projects(claude_dir)?;
    let targets: Vec<SessionTarget<'_>> = projects
        .iter()
        .enumerate()
        .flat_map(|(project, info)| {
            info.session_files.iter().map(move |path| SessionTarget { project, path })
        })
        .collect();

    let tallies: Vec<(usize, SessionTally)> = targets
        .par_iter()
        .filter_map(|target| {
            let mut tally = SessionTally::default();
            match for_each_record(target.path, max_file_bytes, |value| tally.record(value)) {
                Ok(()) => Some((target.project, tally)),
                Err(e) => {
                    tracing::warn!(
                        path = %target.path.display(),
                        error = %e,
                        "skipping session in stats"
                    );
                    None
                }
            }
        })
        .collect();

    let mut stats = DashboardStats::default();
    let mut project_stats: Vec<ProjectStats> = projects
        .iter()
        .map(|info| ProjectStats {
            name: info.name.clone(),
            path: info.project_dir.clone(),
            total_input_tokens: 0,
            total_output_tokens: 0,
            session_count: 0,
        })
        .collect();
    let mut daily: BTreeMap<String, DailyStats> = BTreeMap::new();
    let mut hourly: HashMap<(u8, u8), u32> = HashMap::new();
    let mut duration_secs = 0i64;
    let mut timed_sessions = 0u32;

    for (project, tally) in tallies {
        let entry = &mut project_stats[project];
        entry.total_input_tokens += tally.input_tokens;
        entry.total_output_tokens += tally.output_tokens;
        entry.session_count += 1;

        stats.total_input_tokens += tally.input_tokens;
        stats.total_output_tokens += tally.output_tokens;
        stats.total_messages += tally.messages;
        stats.total_sessions += 1;

        if let Some(secs) = tally.duration_secs() {
            duration_secs += secs;
            timed_sessions += 1;
        }

        for (cell, count) in &tally.hourly {
            *hourly.entry(*cell).or_default() += count;
        }
        for (date, day) in tally.daily {
            let merged = daily.entry(date).or_insert_with_key(|date| DailyStats {
                date: date.clone(),
                ..DailyStats::default()
            });
            merged.input_tokens += day.input_tokens;
            merged.output_tokens += day.output_tokens;
            merged.message_count += day.message_count;
            if day.message_count > 0 {
                merged.session_count += 1;
            }
        }
    }

    project_stats.retain(|p| p.session_count > 0);
    project_stats
        .sort_by(|a, b| b.total_tokens().cmp(&a.total_tokens()).then_with(|| a.name.cmp(&b.name)));

    let mut hourly_activity: Vec<HourlyActivity> = hourly
        .into_iter()
        .map(|((day, hour), count)| HourlyActivity { hour, day, count })
        .collect();
    hourly_activity.sort_by_key(|cell| (cell.day, cell.hour));

    stats.daily_stats = daily.into_values().collect();
    stats.hourly_activity = hourly_activity;
    stats.project_stats = project_stats;
    stats.estimated_cost = estimate_cost(stats.total_input_tokens, stats.total_output_tokens);
    stats.avg_session_minutes = if timed_sessions > 0 {
        duration_secs as f64 / f64::from(timed_sessions) / 60.0
    } else {
        0.0
    };

    tracing::debug!(
        sessions = stats.total_sessions,
        messages = stats.total_messages,
        "dashboard stats aggregated"
    );
    Ok(stats)
}

/// Estimated cost in US dollars at the flat per-million-token rates
pub fn estimate_cost(input_tokens: u64, output_tokens: u64) -> f64 {
    let input = input_tokens as f64 * INPUT_COST_PER_MILLION;
    let output = output_tokens as f64 * OUTPUT_COST_PER_MILLION;
    (input + output) / 1_000_000.0
}
