//! Shared formatting helpers for CLI commands.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Formats fractional hours as "Xh Ym", rounded to the nearest minute.
///
/// Negative values are treated as zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "hour totals are far below i64::MAX minutes"
)]
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours.max(0.0) * 60.0).round() as i64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Formats a running timer as HH:MM:SS.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Formats a UTC timestamp as local "YYYY-MM-DD HH:MM".
pub fn format_local<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// First eight characters of an ID, enough to recognize it in a listing.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}
