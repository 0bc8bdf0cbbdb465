//! Core domain logic for HR time tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Time entries: open/closed work intervals with at most one open entry per employee
//! - The ledger: start/stop tracking and day/week/month statistics
//! - Timesheets: Sunday-aligned weekly summaries with a draft/submitted lifecycle
//! - The record store abstraction the above persist through

mod aggregator;
pub mod calendar;
mod error;
mod ledger;
pub mod project;
pub mod store;
pub mod time_entry;
pub mod timesheet;
pub mod types;

pub use aggregator::TimesheetAggregator;
pub use calendar::{WeekBounds, week_bounds};
pub use error::{Error, RecordKind, Result, StoreError};
pub use ledger::{TimeEntryLedger, TimeStats, compute_stats, resolve_employee};
pub use project::{Employee, Project};
pub use store::{MemoryStore, OpenedEntry, RecordStore};
pub use time_entry::{NewTimeEntry, TimeEntry};
pub use timesheet::{NewTimesheet, WeeklyTimesheet, weekly_hours};
pub use types::{
    EmployeeId, ProjectId, ProjectStatus, TimeEntryId, TimesheetId, TimesheetStatus,
    ValidationError,
};
