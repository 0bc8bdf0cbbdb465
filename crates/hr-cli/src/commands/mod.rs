//! CLI subcommand implementations.

pub mod employees;
pub mod entries;
pub mod projects;
pub mod status;
pub mod timesheet;
pub mod track;
pub mod util;
