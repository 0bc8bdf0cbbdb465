//! Weekly timesheets - per-employee summaries of one Sunday-aligned week.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{WeekBounds, local_date};
use crate::time_entry::{TimeEntry, total_hours};
use crate::types::{EmployeeId, TimesheetId, TimesheetStatus};

/// One employee's hours for one calendar week.
///
/// `total_hours` is a cache: it can always be recomputed from the employee's
/// time entries for the week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyTimesheet {
    pub id: TimesheetId,
    pub employee_id: EmployeeId,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_hours: f64,
    pub status: TimesheetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl WeeklyTimesheet {
    pub const fn bounds(&self) -> WeekBounds {
        WeekBounds {
            start: self.week_start,
            end: self.week_end,
        }
    }
}

/// Fields for a timesheet that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimesheet {
    pub employee_id: EmployeeId,
    pub week: WeekBounds,
    pub total_hours: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Default note attached to a new timesheet.
pub fn week_note(week: WeekBounds) -> String {
    format!("Weekly timesheet: {} to {}", week.start, week.end)
}

/// Keeps the entries whose start falls on a day of `week` in `tz`.
///
/// The end bound is inclusive to the end of the last day.
pub fn entries_in_week<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    week: WeekBounds,
    tz: &Tz,
) -> Vec<TimeEntry> {
    entries
        .into_iter()
        .filter(|entry| week.contains(local_date(entry.start_time, tz)))
        .cloned()
        .collect()
}

/// Total hours of the closed entries in `entries`.
pub fn weekly_hours(entries: &[TimeEntry]) -> f64 {
    total_hours(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week_bounds;
    use crate::types::TimeEntryId;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn entry(id: &str, start: &str, end: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: TimeEntryId::new(id).unwrap(),
            employee_id: EmployeeId::new("emp-1").unwrap(),
            start_time: ts(start),
            end_time: end.map(ts),
            project_id: None,
            description: None,
        }
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "sum of exact half hours")]
    fn weekly_hours_ignores_open_entry() {
        let entries = vec![
            entry("a", "2025-01-27T09:00:00Z", Some("2025-01-27T12:00:00Z")),
            entry("b", "2025-01-27T13:00:00Z", Some("2025-01-27T17:30:00Z")),
            entry("c", "2025-01-28T09:00:00Z", None),
        ];
        assert_eq!(weekly_hours(&entries), 7.5);
    }

    #[test]
    fn entries_in_week_includes_whole_last_day() {
        let week = week_bounds(NaiveDate::from_ymd_opt(2025, 1, 29).unwrap()).unwrap();
        let entries = vec![
            entry("before", "2025-01-25T23:59:59Z", Some("2025-01-26T00:30:00Z")),
            entry("first", "2025-01-26T00:00:00Z", Some("2025-01-26T01:00:00Z")),
            entry("last", "2025-02-01T23:59:59Z", Some("2025-02-02T00:10:00Z")),
            entry("after", "2025-02-02T00:00:00Z", Some("2025-02-02T01:00:00Z")),
        ];

        let ids: Vec<_> = entries_in_week(&entries, week, &Utc)
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
    }

    #[test]
    fn week_note_names_both_ends() {
        let week = week_bounds(NaiveDate::from_ymd_opt(2025, 1, 29).unwrap()).unwrap();
        assert_eq!(
            week_note(week),
            "Weekly timesheet: 2025-01-26 to 2025-02-01"
        );
    }
}
