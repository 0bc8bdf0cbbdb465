//! Resolving which employee the CLI acts as.

use anyhow::{Context, Result, bail};
use hr_core::{EmployeeId, RecordStore, resolve_employee};

use crate::Config;

/// Picks the employee for this invocation.
///
/// Precedence: `--employee`, then the configured `employee`, then the
/// configured `user` looked up in the employee directory.
pub fn current_employee<S: RecordStore + ?Sized>(
    store: &S,
    flag: Option<&EmployeeId>,
    config: &Config,
) -> Result<EmployeeId> {
    if let Some(id) = flag {
        return Ok(id.clone());
    }
    if let Some(id) = config.employee.as_deref() {
        return EmployeeId::new(id).context("invalid employee id in configuration");
    }
    if let Some(user) = config.user.as_deref() {
        let employee = resolve_employee(store, user)
            .with_context(|| format!("no employee is linked to user {user}"))?;
        tracing::debug!(user, employee = %employee.id, "resolved employee from user");
        return Ok(employee.id);
    }
    bail!(
        "no employee selected. Pass --employee, or set `user` or `employee` in the config (HR_USER / HR_EMPLOYEE)"
    )
}
