//! Start/stop tracking and duration statistics per employee.
//!
//! The ledger keeps no state of its own. The active entry is always derived
//! from the entries the store returns, so it cannot drift from the store.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::calendar::{local_date, same_month, week_bounds};
use crate::error::{Error, RecordKind, Result};
use crate::project::{Employee, Project, active_sorted};
use crate::store::{OpenedEntry, RecordStore};
use crate::time_entry::{NewTimeEntry, TimeEntry};
use crate::types::{EmployeeId, ProjectId};

/// Hours worked in the periods around a reference instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeStats {
    pub today: f64,
    pub week: f64,
    pub month: f64,
    /// Average hours per day of the current week (`week / 7`).
    pub average: f64,
}

/// Tracks open/closed work intervals for employees.
pub struct TimeEntryLedger<'s, S: ?Sized, Tz: TimeZone> {
    store: &'s mut S,
    tz: Tz,
}

impl<'s, S: RecordStore + ?Sized, Tz: TimeZone> TimeEntryLedger<'s, S, Tz> {
    /// Creates a ledger over `store`, bucketing days in `tz`.
    pub fn new(store: &'s mut S, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// Starts tracking for `employee` now.
    pub fn start(
        &mut self,
        employee: &EmployeeId,
        project: Option<ProjectId>,
        description: Option<String>,
    ) -> Result<OpenedEntry> {
        self.start_at(employee, project, description, Utc::now())
    }

    /// Starts tracking at `now`, closing any entry that is still open.
    ///
    /// The previous entry's `end_time` and the new entry's `start_time` are
    /// both `now`. The store performs the close and the insert as one write,
    /// and both records are returned as the store committed them.
    pub fn start_at(
        &mut self,
        employee: &EmployeeId,
        project: Option<ProjectId>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OpenedEntry> {
        self.require_employee(employee)?;
        if let Some(project) = &project {
            if self.store.project(project)?.is_none() {
                return Err(Error::not_found(RecordKind::Project, project));
            }
        }

        let previous = self.active_entry(employee)?;
        let new_entry = NewTimeEntry {
            employee_id: employee.clone(),
            start_time: now,
            project_id: project,
            description: description.filter(|d| !d.trim().is_empty()),
        };
        let opened = self
            .store
            .open_time_entry(&new_entry, previous.as_ref().map(|entry| &entry.id))?;

        if let Some(closed) = &opened.closed {
            tracing::info!(
                employee = %employee,
                entry = %closed.id,
                hours = closed.duration_hours(),
                "closed previous time entry"
            );
        }
        tracing::info!(employee = %employee, entry = %opened.opened.id, "time tracking started");
        Ok(opened)
    }

    /// Stops tracking for `employee` now.
    pub fn stop(&mut self, employee: &EmployeeId) -> Result<Option<TimeEntry>> {
        self.stop_at(employee, Utc::now())
    }

    /// Closes the employee's open entry at `now`.
    ///
    /// Returns `None` when nothing was being tracked.
    pub fn stop_at(
        &mut self,
        employee: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Option<TimeEntry>> {
        self.require_employee(employee)?;
        let Some(active) = self.active_entry(employee)? else {
            tracing::debug!(employee = %employee, "stop requested with no open entry");
            return Ok(None);
        };

        let closed = self.store.close_time_entry(&active.id, now)?;
        tracing::info!(
            employee = %employee,
            entry = %closed.id,
            hours = closed.duration_hours(),
            "time tracking stopped"
        );
        Ok(Some(closed))
    }

    /// The employee's entries, most recent `start_time` first.
    pub fn list_entries(&self, employee: &EmployeeId) -> Result<Vec<TimeEntry>> {
        let mut entries = self.store.time_entries(employee)?;
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(entries)
    }

    /// The employee's open entry, if any.
    pub fn active_entry(&self, employee: &EmployeeId) -> Result<Option<TimeEntry>> {
        Ok(self
            .list_entries(employee)?
            .into_iter()
            .find(TimeEntry::is_open))
    }

    /// Wall-clock hours of `entry`; zero while it is open.
    pub fn duration(entry: &TimeEntry) -> f64 {
        entry.duration_hours()
    }

    /// Hours worked today, this week, this month, and the daily average for
    /// this week, all relative to `now`.
    ///
    /// Only closed entries count. An entry belongs to the period its
    /// `start_time` falls in.
    pub fn stats(&self, employee: &EmployeeId, now: DateTime<Utc>) -> Result<TimeStats> {
        let entries = self.list_entries(employee)?;
        Ok(compute_stats(&entries, now, &self.tz))
    }

    /// Active projects sorted by name, for choosing what to track against.
    pub fn projects(&self) -> Result<Vec<Project>> {
        Ok(active_sorted(self.store.projects()?))
    }

    fn require_employee(&self, employee: &EmployeeId) -> Result<Employee> {
        self.store
            .employee(employee)?
            .ok_or_else(|| Error::not_found(RecordKind::Employee, employee))
    }
}

/// Buckets closed entries into day, week and month totals around `now`.
pub fn compute_stats<Tz: TimeZone>(
    entries: &[TimeEntry],
    now: DateTime<Utc>,
    tz: &Tz,
) -> TimeStats {
    let today = local_date(now, tz);
    let week = week_bounds(today);

    let mut stats = TimeStats::default();
    for entry in entries.iter().filter(|entry| !entry.is_open()) {
        let date = local_date(entry.start_time, tz);
        let hours = entry.duration_hours();
        if date == today {
            stats.today += hours;
        }
        if week.is_some_and(|week| week.contains(date)) {
            stats.week += hours;
        }
        if same_month(date, today) {
            stats.month += hours;
        }
    }
    stats.average = stats.week / 7.0;
    stats
}

/// Resolves the employee linked to an authenticated user account.
pub fn resolve_employee<S: RecordStore + ?Sized>(store: &S, user_id: &str) -> Result<Employee> {
    store
        .employee_by_user(user_id)?
        .ok_or_else(|| Error::not_found(RecordKind::Employee, format!("user {user_id}")))
}
