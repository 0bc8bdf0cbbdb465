//! Weekly timesheet creation and submission.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::calendar::{WeekBounds, week_bounds};
use crate::error::{Error, RecordKind, Result};
use crate::store::RecordStore;
use crate::time_entry::TimeEntry;
use crate::timesheet::{NewTimesheet, WeeklyTimesheet, entries_in_week, week_note, weekly_hours};
use crate::types::{EmployeeId, TimesheetId, TimesheetStatus};

/// Buckets time entries into weeks and drives the timesheet lifecycle.
pub struct TimesheetAggregator<'s, S: ?Sized, Tz: TimeZone> {
    store: &'s mut S,
    tz: Tz,
}

impl<'s, S: RecordStore + ?Sized, Tz: TimeZone> TimesheetAggregator<'s, S, Tz> {
    /// Creates an aggregator over `store`, bucketing days in `tz`.
    pub fn new(store: &'s mut S, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// The Sunday-aligned week containing `date`.
    pub fn week_bounds(date: NaiveDate) -> Option<WeekBounds> {
        week_bounds(date)
    }

    /// The employee's entries that started during the week of `week_start`.
    pub fn entries_for_week(
        &self,
        employee: &EmployeeId,
        week_start: NaiveDate,
    ) -> Result<Vec<TimeEntry>> {
        let entries = self.store.time_entries(employee)?;
        Ok(entries_in_week(&entries, week_containing(week_start)?, &self.tz))
    }

    /// Total hours of the closed entries in `entries`.
    pub fn weekly_hours(entries: &[TimeEntry]) -> f64 {
        weekly_hours(entries)
    }

    /// Creates the draft timesheet for the week containing `week_start`.
    pub fn create(
        &mut self,
        employee: &EmployeeId,
        week_start: NaiveDate,
    ) -> Result<WeeklyTimesheet> {
        self.create_at(employee, week_start, Utc::now())
    }

    /// Creates the draft timesheet for the week containing `week_start`,
    /// stamping it with `now`.
    ///
    /// If the week already has a timesheet it is returned instead. A draft
    /// gets its `total_hours` refreshed first; anything past draft is left
    /// exactly as it was submitted.
    pub fn create_at(
        &mut self,
        employee: &EmployeeId,
        week_start: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WeeklyTimesheet> {
        if self.store.employee(employee)?.is_none() {
            return Err(Error::not_found(RecordKind::Employee, employee));
        }
        let week = week_containing(week_start)?;
        let total_hours = weekly_hours(&self.entries_for_week(employee, week.start)?);

        if let Some(mut existing) = self.store.timesheet_for_week(employee, week.start)? {
            if existing.status != TimesheetStatus::Draft {
                return Ok(existing);
            }
            existing.total_hours = total_hours;
            tracing::debug!(timesheet = %existing.id, total_hours, "refreshed draft timesheet");
            return Ok(self.store.update_timesheet(&existing)?);
        }

        let timesheet = self.store.insert_timesheet(&NewTimesheet {
            employee_id: employee.clone(),
            week,
            total_hours,
            notes: Some(week_note(week)),
            created_at: now,
        })?;
        tracing::info!(
            employee = %employee,
            timesheet = %timesheet.id,
            week_start = %week.start,
            total_hours,
            "timesheet created"
        );
        Ok(timesheet)
    }

    /// Submits a draft timesheet for review.
    pub fn submit(&mut self, id: &TimesheetId) -> Result<WeeklyTimesheet> {
        self.submit_at(id, Utc::now())
    }

    /// Moves a timesheet from `draft` to `submitted` at `now`.
    ///
    /// Hours are recomputed from the entries before the status changes.
    /// Submitting a timesheet that is not a draft fails and changes nothing.
    pub fn submit_at(&mut self, id: &TimesheetId, now: DateTime<Utc>) -> Result<WeeklyTimesheet> {
        let mut timesheet = self
            .store
            .timesheet(id)?
            .ok_or_else(|| Error::not_found(RecordKind::Timesheet, id))?;

        let Some(next) = timesheet.status.submit() else {
            tracing::warn!(timesheet = %id, status = %timesheet.status, "rejected resubmission");
            return Err(Error::InvalidState {
                id: id.clone(),
                status: timesheet.status,
                action: "submit",
            });
        };

        let entries = self.entries_for_week(&timesheet.employee_id, timesheet.week_start)?;
        timesheet.total_hours = weekly_hours(&entries);
        timesheet.status = next;
        timesheet.submitted_at = Some(now);

        let stored = self.store.update_timesheet(&timesheet)?;
        tracing::info!(
            timesheet = %stored.id,
            total_hours = stored.total_hours,
            "timesheet submitted"
        );
        Ok(stored)
    }

    /// The employee's timesheets, most recent week first.
    pub fn timesheets(&self, employee: &EmployeeId) -> Result<Vec<WeeklyTimesheet>> {
        Ok(self.store.timesheets(employee)?)
    }
}

fn week_containing(date: NaiveDate) -> Result<WeekBounds> {
    week_bounds(date).ok_or(Error::DateOutOfRange { date })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TimeEntryLedger;
    use crate::project::Employee;
    use crate::store::MemoryStore;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with_employee() -> (MemoryStore, EmployeeId) {
        let mut store = MemoryStore::new();
        let employee = Employee::new("Katherine Johnson");
        let id = employee.id.clone();
        store.insert_employee(&employee).unwrap();
        (store, id)
    }

    fn track(store: &mut MemoryStore, employee: &EmployeeId, start: &str, end: &str) {
        let mut ledger = TimeEntryLedger::new(store, Utc);
        ledger.start_at(employee, None, None, ts(start)).unwrap();
        ledger.stop_at(employee, ts(end)).unwrap();
    }

    /// 2h Monday + 3h Tuesday, then 1h the following Monday.
    fn two_weeks_of_work() -> (MemoryStore, EmployeeId) {
        let (mut store, employee) = store_with_employee();
        track(&mut store, &employee, "2025-01-27T09:00:00Z", "2025-01-27T11:00:00Z");
        track(&mut store, &employee, "2025-01-28T09:00:00Z", "2025-01-28T12:00:00Z");
        track(&mut store, &employee, "2025-02-03T09:00:00Z", "2025-02-03T10:00:00Z");
        (store, employee)
    }

    #[test]
    fn week_bounds_is_sunday_aligned() {
        let bounds =
            TimesheetAggregator::<MemoryStore, Utc>::week_bounds(date(2025, 2, 1)).unwrap();
        assert_eq!(bounds.start, date(2025, 1, 26));
        assert_eq!(bounds.end, date(2025, 2, 1));
    }

    #[test]
    fn entries_for_week_excludes_following_week() {
        let (mut store, employee) = two_weeks_of_work();
        let aggregator = TimesheetAggregator::new(&mut store, Utc);

        let entries = aggregator
            .entries_for_week(&employee, date(2025, 1, 26))
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(
            entries
                .iter()
                .all(|e| e.start_time < ts("2025-02-02T00:00:00Z"))
        );
        let hours = TimesheetAggregator::<MemoryStore, Utc>::weekly_hours(&entries);
        assert!((hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn create_starts_in_draft_with_computed_hours() {
        let (mut store, employee) = two_weeks_of_work();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);

        // Any day in the week works as the anchor.
        let timesheet = aggregator
            .create_at(&employee, date(2025, 1, 29), ts("2025-02-01T18:00:00Z"))
            .unwrap();
        assert_eq!(timesheet.status, TimesheetStatus::Draft);
        assert_eq!(timesheet.week_start, date(2025, 1, 26));
        assert_eq!(timesheet.week_end, date(2025, 2, 1));
        assert!((timesheet.total_hours - 5.0).abs() < 1e-9);
        assert_eq!(
            timesheet.notes.as_deref(),
            Some("Weekly timesheet: 2025-01-26 to 2025-02-01")
        );
    }

    #[test]
    fn create_twice_refreshes_the_draft() {
        let (mut store, employee) = two_weeks_of_work();
        let first = TimesheetAggregator::new(&mut store, Utc)
            .create_at(&employee, date(2025, 1, 26), ts("2025-01-30T18:00:00Z"))
            .unwrap();

        track(&mut store, &employee, "2025-01-31T09:00:00Z", "2025-01-31T10:30:00Z");

        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let second = aggregator
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-01T18:00:00Z"))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert!((second.total_hours - 6.5).abs() < 1e-9);
        assert_eq!(aggregator.timesheets(&employee).unwrap().len(), 1);
    }

    #[test]
    fn submit_moves_draft_to_submitted() {
        let (mut store, employee) = two_weeks_of_work();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let draft = aggregator
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-01T18:00:00Z"))
            .unwrap();

        let submitted = aggregator
            .submit_at(&draft.id, ts("2025-02-01T18:05:00Z"))
            .unwrap();
        assert_eq!(submitted.status, TimesheetStatus::Submitted);
        assert_eq!(submitted.submitted_at, Some(ts("2025-02-01T18:05:00Z")));
    }

    #[test]
    fn resubmission_is_rejected_and_status_unchanged() {
        let (mut store, employee) = two_weeks_of_work();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let draft = aggregator
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-01T18:00:00Z"))
            .unwrap();
        aggregator
            .submit_at(&draft.id, ts("2025-02-01T18:05:00Z"))
            .unwrap();

        let err = aggregator
            .submit_at(&draft.id, ts("2025-02-01T18:10:00Z"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                status: TimesheetStatus::Submitted,
                ..
            }
        ));

        let stored = store.timesheet(&draft.id).unwrap().unwrap();
        assert_eq!(stored.status, TimesheetStatus::Submitted);
        assert_eq!(stored.submitted_at, Some(ts("2025-02-01T18:05:00Z")));
    }

    #[test]
    fn reviewed_timesheets_cannot_be_submitted() {
        let (mut store, employee) = two_weeks_of_work();
        let draft = TimesheetAggregator::new(&mut store, Utc)
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-01T18:00:00Z"))
            .unwrap();

        for status in [TimesheetStatus::Approved, TimesheetStatus::Rejected] {
            let mut reviewed = draft.clone();
            reviewed.status = status;
            store.update_timesheet(&reviewed).unwrap();

            let err = TimesheetAggregator::new(&mut store, Utc)
                .submit(&draft.id)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidState { .. }));
            assert_eq!(store.timesheet(&draft.id).unwrap().unwrap().status, status);
        }
    }

    #[test]
    fn create_after_submission_returns_frozen_timesheet() {
        let (mut store, employee) = two_weeks_of_work();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let draft = aggregator
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-01T18:00:00Z"))
            .unwrap();
        aggregator
            .submit_at(&draft.id, ts("2025-02-01T18:05:00Z"))
            .unwrap();

        track(&mut store, &employee, "2025-01-31T09:00:00Z", "2025-01-31T10:00:00Z");

        let again = TimesheetAggregator::new(&mut store, Utc)
            .create_at(&employee, date(2025, 1, 26), ts("2025-02-02T09:00:00Z"))
            .unwrap();
        assert_eq!(again.status, TimesheetStatus::Submitted);
        assert!((again.total_hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn submit_unknown_timesheet_is_not_found() {
        let mut store = MemoryStore::new();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let err = aggregator
            .submit(&TimesheetId::new("missing").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: RecordKind::Timesheet,
                ..
            }
        ));
    }

    #[test]
    fn create_at_calendar_edge_is_rejected() {
        let (mut store, employee) = store_with_employee();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);

        for edge in [NaiveDate::MIN, NaiveDate::MAX] {
            let err = aggregator
                .create_at(&employee, edge, ts("2025-02-01T18:00:00Z"))
                .unwrap_err();
            assert!(matches!(err, Error::DateOutOfRange { date } if date == edge));
            assert!(aggregator.entries_for_week(&employee, edge).is_err());
        }
        assert!(aggregator.timesheets(&employee).unwrap().is_empty());
    }

    #[test]
    fn create_for_unknown_employee_is_not_found() {
        let mut store = MemoryStore::new();
        let mut aggregator = TimesheetAggregator::new(&mut store, Utc);
        let err = aggregator
            .create(&EmployeeId::new("ghost").unwrap(), date(2025, 1, 26))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
