//! The record store the ledger and aggregator persist through.
//!
//! The store is the durable owner of every record. Implementations must make
//! each method all-or-nothing: a failed call leaves no partial writes behind.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{RecordKind, StoreError};
use crate::project::{Employee, Project};
use crate::time_entry::{NewTimeEntry, TimeEntry};
use crate::timesheet::{NewTimesheet, WeeklyTimesheet};
use crate::types::{EmployeeId, ProjectId, TimeEntryId, TimesheetId, TimesheetStatus};

/// Result of opening a new time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedEntry {
    /// The entry that was closed to make room for the new one, if any.
    pub closed: Option<TimeEntry>,
    /// The newly opened entry.
    pub opened: TimeEntry,
}

/// CRUD surface over employees, projects, time entries and timesheets.
pub trait RecordStore {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError>;

    /// Looks up the employee linked to an authenticated user account.
    fn employee_by_user(&self, user_id: &str) -> Result<Option<Employee>, StoreError>;

    /// All employees, ordered by name.
    fn employees(&self) -> Result<Vec<Employee>, StoreError>;

    fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError>;

    fn project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// All projects regardless of status, in no particular order.
    fn projects(&self) -> Result<Vec<Project>, StoreError>;

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError>;

    /// An employee's time entries, most recent `start_time` first.
    fn time_entries(&self, employee: &EmployeeId) -> Result<Vec<TimeEntry>, StoreError>;

    /// Inserts a new open entry, first closing `close` at the new entry's
    /// `start_time`. Both writes happen atomically.
    ///
    /// Fails with [`StoreError::Conflict`] if the employee would be left with
    /// more than one open entry.
    fn open_time_entry(
        &mut self,
        entry: &NewTimeEntry,
        close: Option<&TimeEntryId>,
    ) -> Result<OpenedEntry, StoreError>;

    /// Sets `end_time` on an open entry and returns the updated record.
    fn close_time_entry(
        &mut self,
        id: &TimeEntryId,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, StoreError>;

    /// Inserts a draft timesheet. At most one timesheet exists per
    /// employee and week.
    fn insert_timesheet(&mut self, timesheet: &NewTimesheet)
    -> Result<WeeklyTimesheet, StoreError>;

    fn timesheet(&self, id: &TimesheetId) -> Result<Option<WeeklyTimesheet>, StoreError>;

    fn timesheet_for_week(
        &self,
        employee: &EmployeeId,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyTimesheet>, StoreError>;

    /// An employee's timesheets, most recent week first.
    fn timesheets(&self, employee: &EmployeeId) -> Result<Vec<WeeklyTimesheet>, StoreError>;

    /// Overwrites the mutable fields (`total_hours`, `status`, `notes`,
    /// `submitted_at`) of an existing timesheet.
    fn update_timesheet(
        &mut self,
        timesheet: &WeeklyTimesheet,
    ) -> Result<WeeklyTimesheet, StoreError>;
}

/// A [`RecordStore`] held entirely in memory.
///
/// Useful for tests and for embedding the ledger without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    employees: BTreeMap<EmployeeId, Employee>,
    projects: BTreeMap<ProjectId, Project>,
    entries: Vec<TimeEntry>,
    timesheets: Vec<WeeklyTimesheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, id: &TimeEntryId) -> Result<&mut TimeEntry, StoreError> {
        self.entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| StoreError::MissingRecord {
                kind: RecordKind::TimeEntry,
                id: id.to_string(),
            })
    }
}

impl RecordStore for MemoryStore {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.get(id).cloned())
    }

    fn employee_by_user(&self, user_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .values()
            .find(|employee| employee.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<_> = self.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        if self.employees.contains_key(&employee.id) {
            return Err(StoreError::Conflict(format!(
                "employee {} already exists",
                employee.id
            )));
        }
        if let Some(user_id) = employee.user_id.as_deref() {
            if self.employee_by_user(user_id)?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "user {user_id} is already linked to an employee"
                )));
            }
        }
        self.employees.insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    fn project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.get(id).cloned())
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.values().cloned().collect())
    }

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError> {
        if self.projects.contains_key(&project.id) {
            return Err(StoreError::Conflict(format!(
                "project {} already exists",
                project.id
            )));
        }
        self.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn time_entries(&self, employee: &EmployeeId) -> Result<Vec<TimeEntry>, StoreError> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| &entry.employee_id == employee)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(entries)
    }

    fn open_time_entry(
        &mut self,
        entry: &NewTimeEntry,
        close: Option<&TimeEntryId>,
    ) -> Result<OpenedEntry, StoreError> {
        // Validate everything before touching state so a failure changes nothing.
        let still_open = self.entries.iter().find(|existing| {
            existing.employee_id == entry.employee_id
                && existing.is_open()
                && Some(&existing.id) != close
        });
        if let Some(existing) = still_open {
            return Err(StoreError::Conflict(format!(
                "employee {} already has open time entry {}",
                entry.employee_id, existing.id
            )));
        }
        if let Some(id) = close {
            let target = self.entry_mut(id)?;
            if !target.is_open() {
                return Err(StoreError::Conflict(format!(
                    "time entry {id} is already closed"
                )));
            }
        }

        let closed = match close {
            Some(id) => {
                let target = self.entry_mut(id)?;
                target.end_time = Some(entry.start_time);
                Some(target.clone())
            }
            None => None,
        };

        let opened = TimeEntry {
            id: TimeEntryId::generate(),
            employee_id: entry.employee_id.clone(),
            start_time: entry.start_time,
            end_time: None,
            project_id: entry.project_id.clone(),
            description: entry.description.clone(),
        };
        self.entries.push(opened.clone());

        Ok(OpenedEntry { closed, opened })
    }

    fn close_time_entry(
        &mut self,
        id: &TimeEntryId,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, StoreError> {
        let target = self.entry_mut(id)?;
        if !target.is_open() {
            return Err(StoreError::Conflict(format!(
                "time entry {id} is already closed"
            )));
        }
        target.end_time = Some(end_time);
        Ok(target.clone())
    }

    fn insert_timesheet(
        &mut self,
        timesheet: &NewTimesheet,
    ) -> Result<WeeklyTimesheet, StoreError> {
        if self
            .timesheet_for_week(&timesheet.employee_id, timesheet.week.start)?
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "employee {} already has a timesheet for the week of {}",
                timesheet.employee_id, timesheet.week.start
            )));
        }
        let stored = WeeklyTimesheet {
            id: TimesheetId::generate(),
            employee_id: timesheet.employee_id.clone(),
            week_start: timesheet.week.start,
            week_end: timesheet.week.end,
            total_hours: timesheet.total_hours,
            status: TimesheetStatus::Draft,
            notes: timesheet.notes.clone(),
            created_at: timesheet.created_at,
            submitted_at: None,
        };
        self.timesheets.push(stored.clone());
        Ok(stored)
    }

    fn timesheet(&self, id: &TimesheetId) -> Result<Option<WeeklyTimesheet>, StoreError> {
        Ok(self.timesheets.iter().find(|ts| &ts.id == id).cloned())
    }

    fn timesheet_for_week(
        &self,
        employee: &EmployeeId,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyTimesheet>, StoreError> {
        Ok(self
            .timesheets
            .iter()
            .find(|ts| &ts.employee_id == employee && ts.week_start == week_start)
            .cloned())
    }

    fn timesheets(&self, employee: &EmployeeId) -> Result<Vec<WeeklyTimesheet>, StoreError> {
        let mut timesheets: Vec<_> = self
            .timesheets
            .iter()
            .filter(|ts| &ts.employee_id == employee)
            .cloned()
            .collect();
        timesheets.sort_by(|a, b| b.week_start.cmp(&a.week_start));
        Ok(timesheets)
    }

    fn update_timesheet(
        &mut self,
        timesheet: &WeeklyTimesheet,
    ) -> Result<WeeklyTimesheet, StoreError> {
        let target = self
            .timesheets
            .iter_mut()
            .find(|ts| ts.id == timesheet.id)
            .ok_or_else(|| StoreError::MissingRecord {
                kind: RecordKind::Timesheet,
                id: timesheet.id.to_string(),
            })?;
        target.total_hours = timesheet.total_hours;
        target.status = timesheet.status;
        target.notes.clone_from(&timesheet.notes);
        target.submitted_at = timesheet.submitted_at;
        Ok(target.clone())
    }
}
