//! Weekly timesheet commands.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use hr_core::calendar::{local_date, week_bounds};
use hr_core::{EmployeeId, RecordStore, TimesheetAggregator, TimesheetId, WeeklyTimesheet};
use hr_db::Database;

use super::util::{format_hours, format_local};

/// Which week a timesheet is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Week {
    Current,
    Previous,
    Containing(NaiveDate),
}

impl Week {
    /// Resolves to a date inside the chosen week, or `None` when the
    /// previous week falls before the first representable one.
    pub fn date<Tz: TimeZone>(self, now: DateTime<Utc>, tz: &Tz) -> Option<NaiveDate> {
        match self {
            Self::Current => Some(local_date(now, tz)),
            Self::Previous => Some(week_bounds(local_date(now, tz))?.previous()?.start),
            Self::Containing(date) => Some(date),
        }
    }
}

/// Creates (or refreshes) the timesheet for `week`.
pub fn create<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    week: Week,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    let date = week
        .date(now, &tz)
        .with_context(|| format!("no calendar week before {}", local_date(now, &tz)))?;
    let timesheet = TimesheetAggregator::new(db, tz).create_at(employee, date, now)?;
    writeln!(
        writer,
        "Timesheet {} for {} to {}: {} ({})",
        timesheet.id,
        timesheet.week_start,
        timesheet.week_end,
        format_hours(timesheet.total_hours),
        timesheet.status
    )?;
    Ok(())
}

/// Submits one of the employee's draft timesheets.
pub fn submit<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    id: &TimesheetId,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<()> {
    if let Some(existing) = db.timesheet(id)? {
        if &existing.employee_id != employee {
            bail!("timesheet {id} belongs to another employee");
        }
    }
    let timesheet = TimesheetAggregator::new(db, tz).submit_at(id, now)?;
    writeln!(
        writer,
        "Submitted timesheet {} for {} to {}: {}",
        timesheet.id,
        timesheet.week_start,
        timesheet.week_end,
        format_hours(timesheet.total_hours)
    )?;
    Ok(())
}

/// Lists the employee's timesheets, most recent week first.
pub fn list<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    employee: &EmployeeId,
    json: bool,
    tz: Tz,
) -> Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let timesheets = TimesheetAggregator::new(db, tz.clone()).timesheets(employee)?;
    if json {
        serde_json::to_writer_pretty(&mut *writer, &timesheets)?;
        writeln!(writer)?;
    } else {
        format_timesheets(writer, &timesheets, &tz)?;
    }
    Ok(())
}

/// Writes timesheets as a table.
pub fn format_timesheets<W: Write, Tz: TimeZone>(
    writer: &mut W,
    timesheets: &[WeeklyTimesheet],
    tz: &Tz,
) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    if timesheets.is_empty() {
        writeln!(writer, "No timesheets.")?;
        writeln!(writer)?;
        writeln!(writer, "Hint: Run 'hr timesheet create' for the current week.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<24}  {:>7}  {:<9}  {:<16}  ID",
        "Week", "Hours", "Status", "Submitted"
    )?;
    for timesheet in timesheets {
        let week = timesheet.bounds();
        let submitted = timesheet
            .submitted_at
            .map_or_else(|| "-".to_string(), |at| format_local(at, tz));
        writeln!(
            writer,
            "{:<24}  {:>7}  {:<9}  {:<16}  {}",
            format!("{} to {}", week.start, week.end),
            format_hours(timesheet.total_hours),
            timesheet.status.as_str(),
            submitted,
            timesheet.id,
        )?;
    }
    Ok(())
}
