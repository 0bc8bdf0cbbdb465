//! Status command: the running timer and hour totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use hr_core::{EmployeeId, RecordStore, TimeEntryLedger};
use hr_db::Database;

use super::util::{format_elapsed, format_hours, format_local};

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let person = db
        .employee(employee)?
        .with_context(|| format!("employee not found: {employee}"))?;
    let ledger = TimeEntryLedger::new(db, tz.clone());
    let active = ledger.active_entry(employee)?;
    let stats = ledger.stats(employee, now)?;

    writeln!(writer, "Time tracking status")?;
    writeln!(writer, "Employee: {} ({})", person.name, person.id)?;

    match active {
        Some(entry) => {
            writeln!(
                writer,
                "Tracking: since {} ({} elapsed)",
                format_local(entry.start_time, &tz),
                format_elapsed(entry.elapsed(now))
            )?;
            if let Some(project) = &entry.project_id {
                writeln!(writer, "Project:  {project}")?;
            }
            if let Some(description) = &entry.description {
                writeln!(writer, "Note:     {description}")?;
            }
        }
        None => writeln!(writer, "Tracking: not running")?,
    }

    writeln!(writer)?;
    writeln!(writer, "Today:      {}", format_hours(stats.today))?;
    writeln!(writer, "This week:  {}", format_hours(stats.week))?;
    writeln!(writer, "This month: {}", format_hours(stats.month))?;
    writeln!(writer, "Daily avg:  {}", format_hours(stats.average))?;

    Ok(())
}
