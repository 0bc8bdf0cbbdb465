use std::io;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hr_cli::commands::{employees, entries, projects, status, timesheet, track};
use hr_cli::identity::current_employee;
use hr_cli::{Cli, Commands, Config, EmployeesAction, ProjectsAction, TimesheetAction};
use hr_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(cli: &Cli) -> Result<(Database, Config)> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(&cli)?;
    let mut stdout = io::stdout().lock();
    let now = Utc::now();

    match command {
        Commands::Employees(action) => match action {
            EmployeesAction::Add { name, email, user } => {
                employees::add(
                    &mut stdout,
                    &mut db,
                    name,
                    email.as_deref(),
                    user.as_deref(),
                )?;
            }
            EmployeesAction::List => employees::list(&mut stdout, &db)?,
        },
        Commands::Projects(action) => match action {
            ProjectsAction::Add { name } => {
                projects::add(&mut stdout, &mut db, name)?;
            }
            ProjectsAction::List => projects::list(&mut stdout, &mut db)?,
        },
        Commands::Status => {
            let employee = current_employee(&db, cli.employee.as_ref(), &config)?;
            status::run(&mut stdout, &mut db, &employee, now, Local)?;
        }
        Commands::Start {
            project,
            description,
        } => {
            let employee = current_employee(&db, cli.employee.as_ref(), &config)?;
            track::start(
                &mut stdout,
                &mut db,
                &employee,
                project.clone(),
                description.clone(),
                now,
                Local,
            )?;
        }
        Commands::Stop => {
            let employee = current_employee(&db, cli.employee.as_ref(), &config)?;
            track::stop(&mut stdout, &mut db, &employee, now)?;
        }
        Commands::Entries { json } => {
            let employee = current_employee(&db, cli.employee.as_ref(), &config)?;
            entries::run(&mut stdout, &mut db, &employee, *json, Local)?;
        }
        Commands::Timesheet(action) => {
            let employee = current_employee(&db, cli.employee.as_ref(), &config)?;
            match action {
                TimesheetAction::Create { week, last_week } => {
                    let week = if *last_week {
                        timesheet::Week::Previous
                    } else {
                        week.map_or(timesheet::Week::Current, timesheet::Week::Containing)
                    };
                    timesheet::create(&mut stdout, &mut db, &employee, week, now, Local)?;
                }
                TimesheetAction::Submit { id } => {
                    timesheet::submit(&mut stdout, &mut db, &employee, id, now, Local)?;
                }
                TimesheetAction::List { json } => {
                    timesheet::list(&mut stdout, &mut db, &employee, *json, Local)?;
                }
            }
        }
    }

    Ok(())
}
