//! Start and stop commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use hr_core::{EmployeeId, ProjectId, TimeEntryLedger};
use hr_db::Database;

use super::util::{format_hours, format_local, short_id};

/// Starts a timer, closing whatever was running.
pub fn start<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    project: Option<ProjectId>,
    description: Option<String>,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let opened =
        TimeEntryLedger::new(db, tz.clone()).start_at(employee, project, description, now)?;

    if let Some(closed) = &opened.closed {
        writeln!(
            writer,
            "Stopped {} ({})",
            short_id(closed.id.as_str()),
            format_hours(closed.duration_hours())
        )?;
    }
    let entry = opened.opened;
    write!(
        writer,
        "Started {} at {}",
        short_id(entry.id.as_str()),
        format_local(entry.start_time, &tz)
    )?;
    if let Some(project) = &entry.project_id {
        write!(writer, " on {project}")?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Stops the running timer, if there is one.
pub fn stop<W: Write>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut ledger = TimeEntryLedger::new(db, Utc);
    match ledger.stop_at(employee, now)? {
        Some(entry) => writeln!(
            writer,
            "Stopped {} ({})",
            short_id(entry.id.as_str()),
            format_hours(entry.duration_hours())
        )?,
        None => writeln!(writer, "Not tracking.")?,
    }
    Ok(())
}
