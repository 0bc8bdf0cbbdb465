//! Entries command: an employee's time entries, most recent first.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use serde::Serialize;

use hr_core::time_entry::total_hours;
use hr_core::{EmployeeId, TimeEntry, TimeEntryLedger};
use hr_db::Database;

use super::util::{format_hours, format_local};

/// A time entry with its computed duration, for JSON output.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    #[serde(flatten)]
    pub entry: TimeEntry,
    pub hours: f64,
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    json: bool,
    tz: Tz,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let ledger = TimeEntryLedger::new(db, tz.clone());
    let entries = ledger.list_entries(employee)?;

    if json {
        let output: Vec<EntryOutput> = entries
            .into_iter()
            .map(|entry| EntryOutput {
                hours: entry.duration_hours(),
                entry,
            })
            .collect();
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "No time entries.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<16}  {:<16}  {:>7}  {:<14}  Note",
        "Start", "End", "Hours", "Project"
    )?;
    for entry in &entries {
        let end = entry
            .end_time
            .map_or_else(|| "running".to_string(), |end| format_local(end, &tz));
        let hours = if entry.is_open() {
            "-".to_string()
        } else {
            format_hours(entry.duration_hours())
        };
        writeln!(
            writer,
            "{:<16}  {:<16}  {:>7}  {:<14}  {}",
            format_local(entry.start_time, &tz),
            end,
            hours,
            entry.project_id.as_ref().map_or("-", |p| p.as_str()),
            entry.description.as_deref().unwrap_or("-"),
        )?;
    }

    let total = total_hours(&entries);
    writeln!(writer)?;
    writeln!(writer, "Total: {} (closed entries)", format_hours(total))?;
    Ok(())
}
