//! Storage layer for HR time tracking.
//!
//! Provides a [`RecordStore`] backed by SQLite via `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering. Calendar dates (timesheet weeks) are stored as
//! `YYYY-MM-DD`.
//!
//! ## Open entries
//!
//! A partial unique index on `time_entries(employee_id) WHERE end_time IS NULL`
//! guarantees at most one open entry per employee, even when two processes
//! race to start tracking. The loser gets [`StoreError::Conflict`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, Transaction, params};
use thiserror::Error;

use hr_core::{
    Employee, EmployeeId, NewTimeEntry, NewTimesheet, OpenedEntry, Project, ProjectId,
    ProjectStatus, RecordKind, RecordStore, StoreError, TimeEntry, TimeEntryId, TimesheetId,
    TimesheetStatus, WeeklyTimesheet,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp or date could not be parsed.
    #[error("invalid timestamp in {table} row {id}: {value}")]
    TimestampParse {
        table: &'static str,
        id: String,
        value: String,
    },
    /// A stored row holds a value the domain types reject.
    #[error("invalid {table} row {id}: {message}")]
    InvalidRecord {
        table: &'static str,
        id: String,
        message: String,
    },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, message))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(message.unwrap_or_else(|| failure.to_string()))
            }
            other => Self::backend(other),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                user_id TEXT UNIQUE
            );

            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
            );

            -- start_time/end_time: ISO 8601 UTC; end_time NULL while tracking
            CREATE TABLE IF NOT EXISTS time_entries (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                project_id TEXT,
                description TEXT,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_time_entries_employee_start
                ON time_entries(employee_id, start_time);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_time_entries_one_open
                ON time_entries(employee_id) WHERE end_time IS NULL;

            -- week_start/week_end: YYYY-MM-DD, Sunday through Saturday
            CREATE TABLE IF NOT EXISTS timesheets (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                week_start TEXT NOT NULL,
                week_end TEXT NOT NULL,
                total_hours REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'draft'
                    CHECK (status IN ('draft', 'submitted', 'approved', 'rejected')),
                notes TEXT,
                created_at TEXT NOT NULL,
                submitted_at TEXT,
                UNIQUE (employee_id, week_start),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );
            ",
        )?;
        Ok(())
    }

    fn query_time_entry(&self, id: &TimeEntryId) -> Result<Option<TimeEntry>, DbError> {
        select_time_entry(&self.conn, id)
    }
}

// ========== Row Mapping ==========

const TIME_ENTRY_COLUMNS: &str = "id, employee_id, start_time, end_time, project_id, description";
const TIMESHEET_COLUMNS: &str = "id, employee_id, week_start, week_end, total_hours, status, notes, created_at, submitted_at";

struct TimeEntryRow {
    id: String,
    employee_id: String,
    start_time: String,
    end_time: Option<String>,
    project_id: Option<String>,
    description: Option<String>,
}

impl TimeEntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            project_id: row.get(4)?,
            description: row.get(5)?,
        })
    }

    fn into_entry(self) -> Result<TimeEntry, DbError> {
        const TABLE: &str = "time_entries";
        let start_time = parse_timestamp(&self.start_time, TABLE, &self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|value| parse_timestamp(value, TABLE, &self.id))
            .transpose()?;
        let project_id = self
            .project_id
            .map(|value| ProjectId::new(value).map_err(|e| invalid(TABLE, &self.id, e)))
            .transpose()?;
        Ok(TimeEntry {
            employee_id: EmployeeId::new(self.employee_id)
                .map_err(|e| invalid(TABLE, &self.id, e))?,
            start_time,
            end_time,
            project_id,
            description: self.description,
            id: TimeEntryId::new(self.id).map_err(|e| invalid(TABLE, "", e))?,
        })
    }
}

struct TimesheetRow {
    id: String,
    employee_id: String,
    week_start: String,
    week_end: String,
    total_hours: f64,
    status: String,
    notes: Option<String>,
    created_at: String,
    submitted_at: Option<String>,
}

impl TimesheetRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            week_start: row.get(2)?,
            week_end: row.get(3)?,
            total_hours: row.get(4)?,
            status: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            submitted_at: row.get(8)?,
        })
    }

    fn into_timesheet(self) -> Result<WeeklyTimesheet, DbError> {
        const TABLE: &str = "timesheets";
        let status: TimesheetStatus = self
            .status
            .parse()
            .map_err(|e| invalid(TABLE, &self.id, e))?;
        Ok(WeeklyTimesheet {
            employee_id: EmployeeId::new(self.employee_id)
                .map_err(|e| invalid(TABLE, &self.id, e))?,
            week_start: parse_date(&self.week_start, TABLE, &self.id)?,
            week_end: parse_date(&self.week_end, TABLE, &self.id)?,
            total_hours: self.total_hours,
            status,
            notes: self.notes,
            created_at: parse_timestamp(&self.created_at, TABLE, &self.id)?,
            submitted_at: self
                .submitted_at
                .as_deref()
                .map(|value| parse_timestamp(value, TABLE, &self.id))
                .transpose()?,
            id: TimesheetId::new(self.id).map_err(|e| invalid(TABLE, "", e))?,
        })
    }
}

type EmployeeColumns = (String, String, Option<String>, Option<String>);

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<EmployeeColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_employee((id, name, email, user_id): EmployeeColumns) -> Result<Employee, DbError> {
    Ok(Employee {
        id: EmployeeId::new(id).map_err(|e| invalid("employees", "", e))?,
        name,
        email,
        user_id,
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_project((id, name, status): (String, String, String)) -> Result<Project, DbError> {
    let status: ProjectStatus = status.parse().map_err(|e| invalid("projects", &id, e))?;
    Ok(Project {
        id: ProjectId::new(id).map_err(|e| invalid("projects", "", e))?,
        name,
        status,
    })
}

fn select_time_entry(conn: &Connection, id: &TimeEntryId) -> Result<Option<TimeEntry>, DbError> {
    let row = conn
        .query_row(
            &format!("SELECT {TIME_ENTRY_COLUMNS} FROM time_entries WHERE id = ?"),
            [id.as_str()],
            TimeEntryRow::from_row,
        )
        .optional()?;
    row.map(TimeEntryRow::into_entry).transpose()
}

fn select_timesheet(
    conn: &Connection,
    id: &TimesheetId,
) -> Result<Option<WeeklyTimesheet>, DbError> {
    let row = conn
        .query_row(
            &format!("SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE id = ?"),
            [id.as_str()],
            TimesheetRow::from_row,
        )
        .optional()?;
    row.map(TimesheetRow::into_timesheet).transpose()
}

/// Closes `id` inside `tx`, distinguishing a missing entry from a closed one.
fn close_in_tx(
    tx: &Transaction<'_>,
    id: &TimeEntryId,
    end_time: DateTime<Utc>,
) -> Result<(), StoreError> {
    let updated = tx
        .execute(
            "UPDATE time_entries SET end_time = ? WHERE id = ? AND end_time IS NULL",
            params![format_timestamp(end_time), id.as_str()],
        )
        .map_err(DbError::from)?;
    if updated == 1 {
        return Ok(());
    }
    if select_time_entry(tx, id)?.is_some() {
        Err(StoreError::Conflict(format!("time entry {id} is already closed")))
    } else {
        Err(StoreError::MissingRecord {
            kind: RecordKind::TimeEntry,
            id: id.to_string(),
        })
    }
}

fn invalid(table: &'static str, id: &str, err: impl std::fmt::Display) -> DbError {
    DbError::InvalidRecord {
        table,
        id: id.to_string(),
        message: err.to_string(),
    }
}

fn parse_timestamp(value: &str, table: &'static str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DbError::TimestampParse {
            table,
            id: id.to_string(),
            value: value.to_string(),
        })
}

fn parse_date(value: &str, table: &'static str, id: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DbError::TimestampParse {
        table,
        id: id.to_string(),
        value: value.to_string(),
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ========== RecordStore ==========

impl RecordStore for Database {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, email, user_id FROM employees WHERE id = ?",
                [id.as_str()],
                employee_from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(row.map(into_employee).transpose()?)
    }

    fn employee_by_user(&self, user_id: &str) -> Result<Option<Employee>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, email, user_id FROM employees WHERE user_id = ?",
                [user_id],
                employee_from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(row.map(into_employee).transpose()?)
    }

    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, user_id FROM employees ORDER BY name ASC, id ASC")
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([], employee_from_row)
            .map_err(DbError::from)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(into_employee(row.map_err(DbError::from)?)?);
        }
        Ok(employees)
    }

    fn insert_employee(&mut self, employee: &Employee) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO employees (id, name, email, user_id) VALUES (?, ?, ?, ?)",
                params![
                    employee.id.as_str(),
                    employee.name,
                    employee.email,
                    employee.user_id
                ],
            )
            .map_err(DbError::from)?;
        tracing::debug!(employee = %employee.id, "inserted employee");
        Ok(())
    }

    fn project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, status FROM projects WHERE id = ?",
                [id.as_str()],
                project_from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(row.map(into_project).transpose()?)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, status FROM projects ORDER BY id ASC")
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([], project_from_row)
            .map_err(DbError::from)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(into_project(row.map_err(DbError::from)?)?);
        }
        Ok(projects)
    }

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO projects (id, name, status) VALUES (?, ?, ?)",
                params![project.id.as_str(), project.name, project.status.as_str()],
            )
            .map_err(DbError::from)?;
        Ok(())
    }

    fn time_entries(&self, employee: &EmployeeId) -> Result<Vec<TimeEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "
                SELECT {TIME_ENTRY_COLUMNS}
                FROM time_entries
                WHERE employee_id = ?
                ORDER BY start_time DESC, id ASC
                "
            ))
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([employee.as_str()], TimeEntryRow::from_row)
            .map_err(DbError::from)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(DbError::from)?.into_entry()?);
        }
        Ok(entries)
    }

    fn open_time_entry(
        &mut self,
        entry: &NewTimeEntry,
        close: Option<&TimeEntryId>,
    ) -> Result<OpenedEntry, StoreError> {
        let id = TimeEntryId::generate();
        let tx = self.conn.transaction().map_err(DbError::from)?;

        if let Some(previous) = close {
            close_in_tx(&tx, previous, entry.start_time)?;
        }
        tx.execute(
            "
            INSERT INTO time_entries (id, employee_id, start_time, end_time, project_id, description)
            VALUES (?, ?, ?, NULL, ?, ?)
            ",
            params![
                id.as_str(),
                entry.employee_id.as_str(),
                format_timestamp(entry.start_time),
                entry.project_id.as_ref().map(ProjectId::as_str),
                entry.description,
            ],
        )
        .map_err(DbError::from)?;

        let closed = close
            .map(|previous| select_time_entry(&tx, previous))
            .transpose()?
            .flatten();
        let opened = select_time_entry(&tx, &id)?.ok_or_else(|| StoreError::MissingRecord {
            kind: RecordKind::TimeEntry,
            id: id.to_string(),
        })?;
        tx.commit().map_err(DbError::from)?;

        tracing::debug!(entry = %opened.id, closed = closed.is_some(), "opened time entry");
        Ok(OpenedEntry { closed, opened })
    }

    fn close_time_entry(
        &mut self,
        id: &TimeEntryId,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, StoreError> {
        let tx = self.conn.transaction().map_err(DbError::from)?;
        close_in_tx(&tx, id, end_time)?;
        tx.commit().map_err(DbError::from)?;

        self.query_time_entry(id)?
            .ok_or_else(|| StoreError::MissingRecord {
                kind: RecordKind::TimeEntry,
                id: id.to_string(),
            })
    }

    fn insert_timesheet(
        &mut self,
        timesheet: &NewTimesheet,
    ) -> Result<WeeklyTimesheet, StoreError> {
        let id = TimesheetId::generate();
        self.conn
            .execute(
                "
                INSERT INTO timesheets
                (id, employee_id, week_start, week_end, total_hours, status, notes, created_at, submitted_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)
                ",
                params![
                    id.as_str(),
                    timesheet.employee_id.as_str(),
                    format_date(timesheet.week.start),
                    format_date(timesheet.week.end),
                    timesheet.total_hours,
                    TimesheetStatus::Draft.as_str(),
                    timesheet.notes,
                    format_timestamp(timesheet.created_at),
                ],
            )
            .map_err(DbError::from)?;

        select_timesheet(&self.conn, &id)?.ok_or_else(|| StoreError::MissingRecord {
            kind: RecordKind::Timesheet,
            id: id.to_string(),
        })
    }

    fn timesheet(&self, id: &TimesheetId) -> Result<Option<WeeklyTimesheet>, StoreError> {
        Ok(select_timesheet(&self.conn, id)?)
    }

    fn timesheet_for_week(
        &self,
        employee: &EmployeeId,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyTimesheet>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE employee_id = ? AND week_start = ?"
                ),
                params![employee.as_str(), format_date(week_start)],
                TimesheetRow::from_row,
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(row.map(TimesheetRow::into_timesheet).transpose()?)
    }

    fn timesheets(&self, employee: &EmployeeId) -> Result<Vec<WeeklyTimesheet>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "
                SELECT {TIMESHEET_COLUMNS}
                FROM timesheets
                WHERE employee_id = ?
                ORDER BY week_start DESC
                "
            ))
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([employee.as_str()], TimesheetRow::from_row)
            .map_err(DbError::from)?;
        let mut timesheets = Vec::new();
        for row in rows {
            timesheets.push(row.map_err(DbError::from)?.into_timesheet()?);
        }
        Ok(timesheets)
    }

    fn update_timesheet(
        &mut self,
        timesheet: &WeeklyTimesheet,
    ) -> Result<WeeklyTimesheet, StoreError> {
        let updated = self
            .conn
            .execute(
                "
                UPDATE timesheets
                SET total_hours = ?, status = ?, notes = ?, submitted_at = ?
                WHERE id = ?
                ",
                params![
                    timesheet.total_hours,
                    timesheet.status.as_str(),
                    timesheet.notes,
                    timesheet.submitted_at.map(format_timestamp),
                    timesheet.id.as_str(),
                ],
            )
            .map_err(DbError::from)?;
        if updated == 0 {
            return Err(StoreError::MissingRecord {
                kind: RecordKind::Timesheet,
                id: timesheet.id.to_string(),
            });
        }
        tracing::debug!(timesheet = %timesheet.id, status = %timesheet.status, "updated timesheet");

        select_timesheet(&self.conn, &timesheet.id)?.ok_or_else(|| StoreError::MissingRecord {
            kind: RecordKind::Timesheet,
            id: timesheet.id.to_string(),
        })
    }
}
