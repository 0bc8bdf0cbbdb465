//! Project commands.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use hr_core::{Project, RecordStore, TimeEntryLedger};
use hr_db::Database;

/// Adds an active project and prints the generated ID.
pub fn add<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<Project> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "project name cannot be empty");

    let project = Project::new(name);
    db.insert_project(&project)?;
    tracing::info!(project = %project.id, "project added");

    writeln!(writer, "Added project {} ({})", project.name, project.id)?;
    Ok(project)
}

/// Lists the projects time can be booked against.
pub fn list<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let projects = TimeEntryLedger::new(db, Utc).projects()?;
    if projects.is_empty() {
        writeln!(writer, "No active projects.")?;
        return Ok(());
    }

    writeln!(writer, "{:<36}  Name", "ID")?;
    for project in &projects {
        writeln!(writer, "{:<36}  {}", project.id.as_str(), project.name)?;
    }
    Ok(())
}
