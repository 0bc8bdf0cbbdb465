//! End-to-end tests driving the `hr` binary against a scratch database.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn hr_binary() -> String {
    env!("CARGO_BIN_EXE_hr").to_string()
}

/// Runs `hr` with an isolated home directory and database.
fn hr(temp: &Path, user: Option<&str>, args: &[&str]) -> Output {
    let mut command = Command::new(hr_binary());
    command
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("XDG_DATA_HOME", temp.join(".local/share"))
        .env("HR_DATABASE_PATH", temp.join("hr.db"))
        .env_remove("HR_EMPLOYEE")
        .env_remove("HR_USER")
        .env_remove("RUST_LOG")
        .args(args);
    if let Some(user) = user {
        command.env("HR_USER", user);
    }
    command.output().expect("failed to run hr")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "hr should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

/// Pulls the ID out of "Added <kind> <name> (<id>)".
fn added_id(stdout: &str) -> String {
    let open = stdout.rfind('(').unwrap();
    let close = stdout.rfind(')').unwrap();
    stdout[open + 1..close].to_string()
}

#[test]
fn test_track_and_submit_week() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let user = Some("auth|ada");

    let added = stdout_of(&hr(
        home,
        None,
        &["employees", "add", "--name", "Ada Lovelace", "--user", "auth|ada"],
    ));
    let employee_id = added_id(&added);
    let project_id = added_id(&stdout_of(&hr(
        home,
        None,
        &["projects", "add", "--name", "Payroll"],
    )));

    let started = stdout_of(&hr(home, user, &["start", "--project", &project_id]));
    assert!(started.starts_with("Started "), "got: {started}");
    assert!(started.trim_end().ends_with(&format!("on {project_id}")));

    let status = stdout_of(&hr(home, user, &["status"]));
    assert!(status.contains(&format!("Employee: Ada Lovelace ({employee_id})")));
    assert!(status.contains("Tracking: since"));

    // Starting again closes the running entry.
    let restarted = stdout_of(&hr(home, user, &["start", "-d", "review"]));
    assert!(restarted.starts_with("Stopped "), "got: {restarted}");

    let stopped = stdout_of(&hr(home, user, &["stop"]));
    assert!(stopped.starts_with("Stopped "));
    assert_eq!(stdout_of(&hr(home, user, &["stop"])), "Not tracking.\n");

    let entries: serde_json::Value =
        serde_json::from_str(&stdout_of(&hr(home, user, &["entries", "--json"]))).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.get("end_time").is_some()));
    assert_eq!(entries[0]["description"], "review");
    assert_eq!(entries[1]["project_id"], project_id.as_str());
    assert_eq!(entries[1]["end_time"], entries[0]["start_time"]);

    let created = stdout_of(&hr(home, user, &["timesheet", "create"]));
    assert!(created.trim_end().ends_with("(draft)"), "got: {created}");
    let timesheet_id = created.split_whitespace().nth(1).unwrap().to_string();

    let submitted = stdout_of(&hr(home, user, &["timesheet", "submit", &timesheet_id]));
    assert!(submitted.starts_with(&format!("Submitted timesheet {timesheet_id}")));

    let resubmit = hr(home, user, &["timesheet", "submit", &timesheet_id]);
    assert!(!resubmit.status.success());
    assert!(String::from_utf8_lossy(&resubmit.stderr).contains("already submitted"));

    let timesheets: serde_json::Value = serde_json::from_str(&stdout_of(&hr(
        home,
        user,
        &["timesheet", "list", "--json"],
    )))
    .unwrap();
    assert_eq!(timesheets[0]["id"], timesheet_id.as_str());
    assert_eq!(timesheets[0]["status"], "submitted");
    assert!(timesheets[0].get("submitted_at").is_some());
}

#[test]
fn test_employee_flag_bypasses_user_lookup() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let employee_id = added_id(&stdout_of(&hr(
        home,
        None,
        &["employees", "add", "--name", "Grace Hopper"],
    )));

    stdout_of(&hr(home, None, &["--employee", &employee_id, "start"]));
    let status = stdout_of(&hr(home, None, &["--employee", &employee_id, "status"]));
    assert!(status.contains("Grace Hopper"));
}

#[test]
fn test_commands_without_employee_fail() {
    let temp = TempDir::new().unwrap();
    let output = hr(temp.path(), None, &["start"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no employee selected"));
}

#[test]
fn test_unknown_user_fails() {
    let temp = TempDir::new().unwrap();
    let output = hr(temp.path(), Some("auth|nobody"), &["status"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("auth|nobody"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = hr(temp.path(), None, &[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}
