//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hr_core::{EmployeeId, ProjectId, TimesheetId};

/// HR time tracking.
///
/// Start and stop work timers, review hours, and submit weekly timesheets.
#[derive(Debug, Parser)]
#[command(name = "hr", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this employee instead of resolving the configured user.
    #[arg(short, long, global = true)]
    pub employee: Option<EmployeeId>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the running timer and hour totals.
    Status,

    /// Start tracking time, stopping any running timer first.
    Start {
        /// Project to book the time against.
        #[arg(short, long)]
        project: Option<ProjectId>,

        /// What you are working on.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Stop the running timer.
    Stop,

    /// List time entries, most recent first.
    Entries {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage the employee directory.
    #[command(subcommand)]
    Employees(EmployeesAction),

    /// Manage projects.
    #[command(subcommand)]
    Projects(ProjectsAction),

    /// Create, submit and list weekly timesheets.
    #[command(subcommand)]
    Timesheet(TimesheetAction),
}

#[derive(Debug, Subcommand)]
pub enum EmployeesAction {
    /// Add an employee.
    Add {
        /// Full name.
        #[arg(long)]
        name: String,

        /// Contact email.
        #[arg(long)]
        email: Option<String>,

        /// Login account to link, used to resolve the current employee.
        #[arg(long)]
        user: Option<String>,
    },
    /// List employees.
    List,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsAction {
    /// Add an active project.
    Add {
        /// Project name.
        #[arg(long)]
        name: String,
    },
    /// List active projects.
    List,
}

#[derive(Debug, Subcommand)]
pub enum TimesheetAction {
    /// Create (or refresh) the draft timesheet for a week.
    Create {
        /// Any date in the week, YYYY-MM-DD. Defaults to today.
        #[arg(long)]
        week: Option<NaiveDate>,

        /// Use the week before the current one.
        #[arg(long, conflicts_with = "week")]
        last_week: bool,
    },
    /// Submit a draft timesheet.
    Submit {
        /// Timesheet ID.
        id: TimesheetId,
    },
    /// List timesheets, most recent week first.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
