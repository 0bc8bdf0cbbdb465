//! Work intervals recorded by the time tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, ProjectId, TimeEntryId};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// One continuous work interval for one employee.
///
/// An entry without `end_time` is open: the employee is currently tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeEntry {
    /// Unique identifier, assigned by the store.
    pub id: TimeEntryId,
    /// The employee who worked this interval.
    pub employee_id: EmployeeId,
    /// When tracking started.
    pub start_time: DateTime<Utc>,
    /// When tracking stopped. `None` while the entry is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Optional project the work was booked against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimeEntry {
    /// Whether the entry is still being tracked.
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Wall-clock length of the entry in fractional hours.
    ///
    /// Open entries have a duration of zero. No breaks are subtracted.
    #[expect(
        clippy::cast_precision_loss,
        reason = "millisecond counts of real work intervals fit in f64's mantissa"
    )]
    pub fn duration_hours(&self) -> f64 {
        self.end_time.map_or(0.0, |end| {
            (end - self.start_time).num_milliseconds() as f64 / MS_PER_HOUR
        })
    }

    /// Time elapsed since `start_time`, for displaying a running timer.
    ///
    /// Closed entries report their recorded length instead.
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }
}

/// Fields for an entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub employee_id: EmployeeId,
    pub start_time: DateTime<Utc>,
    pub project_id: Option<ProjectId>,
    pub description: Option<String>,
}

/// Sums the durations of closed entries, in hours.
///
/// Open entries contribute nothing.
pub fn total_hours<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> f64 {
    entries
        .into_iter()
        .filter(|entry| !entry.is_open())
        .map(TimeEntry::duration_hours)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn entry(start: &str, end: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: TimeEntryId::new("entry-1").unwrap(),
            employee_id: EmployeeId::new("emp-1").unwrap(),
            start_time: ts(start),
            end_time: end.map(ts),
            project_id: None,
            description: None,
        }
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for whole and half hours"
    )]
    fn duration_of_closed_entries() {
        let one_hour = entry("2025-01-27T09:00:00Z", Some("2025-01-27T10:00:00Z"));
        assert_eq!(one_hour.duration_hours(), 1.0);

        let ninety_minutes = entry("2025-01-27T09:00:00Z", Some("2025-01-27T10:30:00Z"));
        assert_eq!(ninety_minutes.duration_hours(), 1.5);

        let instant = entry("2025-01-27T09:00:00Z", Some("2025-01-27T09:00:00Z"));
        assert_eq!(instant.duration_hours(), 0.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "open entries are exactly zero")]
    fn open_entry_has_zero_duration() {
        let open = entry("2025-01-27T09:00:00Z", None);
        assert!(open.is_open());
        assert_eq!(open.duration_hours(), 0.0);
    }

    #[test]
    fn duration_is_not_rounded() {
        let e = entry("2025-01-27T09:00:00Z", Some("2025-01-27T09:20:00Z"));
        assert!((e.duration_hours() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_uses_now_for_open_entries() {
        let open = entry("2025-01-27T09:00:00Z", None);
        let elapsed = open.elapsed(ts("2025-01-27T09:45:30Z"));
        assert_eq!(elapsed.num_seconds(), 45 * 60 + 30);

        let closed = entry("2025-01-27T09:00:00Z", Some("2025-01-27T09:10:00Z"));
        assert_eq!(closed.elapsed(ts("2025-01-27T12:00:00Z")).num_minutes(), 10);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "sum of exact half hours")]
    fn total_hours_skips_open_entries() {
        let entries = [
            entry("2025-01-27T09:00:00Z", Some("2025-01-27T12:00:00Z")),
            entry("2025-01-27T13:00:00Z", Some("2025-01-27T17:30:00Z")),
            entry("2025-01-27T18:00:00Z", None),
        ];
        assert_eq!(total_hours(&entries), 7.5);
    }

    #[test]
    fn open_entry_omits_end_time_in_json() {
        let json = serde_json::to_value(entry("2025-01-27T09:00:00Z", None)).unwrap();
        assert!(json.get("end_time").is_none());
        assert_eq!(json["employee_id"], "emp-1");
    }
}
