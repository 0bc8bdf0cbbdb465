//! Error types shared by the ledger, the aggregator and record stores.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{TimesheetId, TimesheetStatus};

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Employee,
    Project,
    TimeEntry,
    Timesheet,
}

impl RecordKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Project => "project",
            Self::TimeEntry => "time entry",
            Self::Timesheet => "timesheet",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call into a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend itself failed (I/O, SQL, corrupt row, ...).
    #[error("record store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The write would violate a store-level constraint.
    #[error("record store conflict: {0}")]
    Conflict(String),

    /// An update targeted a record that does not exist.
    #[error("{kind} {id} does not exist in the store")]
    MissingRecord { kind: RecordKind, id: String },
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(source.into())
    }
}

/// Errors returned by ledger and timesheet operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced employee, project or timesheet does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// The requested transition is not allowed from the current status.
    #[error("cannot {action} timesheet {id}: it is already {status}")]
    InvalidState {
        id: TimesheetId,
        status: TimesheetStatus,
        action: &'static str,
    },

    /// The week around a date falls outside the supported calendar.
    #[error("no calendar week can be formed around {date}")]
    DateOutOfRange { date: NaiveDate },

    /// The record store call failed. Nothing was changed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn not_found(kind: RecordKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
