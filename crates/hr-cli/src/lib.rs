//! HR time tracking CLI library.
//!
//! This crate provides the `hr` command-line interface over the ledger and
//! timesheet aggregator.

mod cli;
pub mod commands;
mod config;
pub mod identity;

pub use cli::{Cli, Commands, EmployeesAction, ProjectsAction, TimesheetAction};
pub use config::Config;
