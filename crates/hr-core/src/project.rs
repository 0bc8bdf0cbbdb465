//! Employees and the projects they book time against.

use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, ProjectId, ProjectStatus};

/// A person in the employee directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identity of the login account linked to this employee, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Employee {
    /// Creates an employee with a generated ID and no linked account.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EmployeeId::generate(),
            name: name.into(),
            email: None,
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// A grouping that time entries can be booked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
}

impl Project {
    /// Creates an active project with a generated ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            status: ProjectStatus::Active,
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.status, ProjectStatus::Active)
    }
}

/// Keeps active projects only, ordered by name for display in pickers.
pub fn active_sorted(projects: impl IntoIterator<Item = Project>) -> Vec<Project> {
    let mut active: Vec<Project> = projects.into_iter().filter(Project::is_active).collect();
    active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_builder_links_account() {
        let employee = Employee::new("Ada Lovelace")
            .with_user("auth|ada")
            .with_email("ada@example.com");

        assert_eq!(employee.user_id.as_deref(), Some("auth|ada"));
        assert_eq!(employee.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn active_sorted_filters_and_orders() {
        let mut archived = Project::new("Archive");
        archived.status = ProjectStatus::Archived;

        let sorted = active_sorted(vec![
            Project::new("Website"),
            archived,
            Project::new("Audit"),
        ]);

        let names: Vec<_> = sorted.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Audit", "Website"]);
    }
}
