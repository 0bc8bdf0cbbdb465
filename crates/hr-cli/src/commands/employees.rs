//! Employee directory commands.

use std::io::Write;

use anyhow::{Context, Result};

use hr_core::{Employee, RecordStore};
use hr_db::Database;

/// Adds an employee and prints the generated ID.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    email: Option<&str>,
    user: Option<&str>,
) -> Result<Employee> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "employee name cannot be empty");

    let mut employee = Employee::new(name);
    if let Some(email) = email {
        employee = employee.with_email(email);
    }
    if let Some(user) = user {
        employee = employee.with_user(user);
    }
    db.insert_employee(&employee)
        .with_context(|| format!("failed to add employee {name}"))?;
    tracing::info!(employee = %employee.id, "employee added");

    writeln!(writer, "Added employee {} ({})", employee.name, employee.id)?;
    Ok(employee)
}

/// Lists employees by name.
pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let employees = db.employees()?;
    if employees.is_empty() {
        writeln!(writer, "No employees.")?;
        writeln!(writer)?;
        writeln!(writer, "Hint: Run 'hr employees add --name <NAME>' to add one.")?;
        return Ok(());
    }

    writeln!(writer, "{:<36}  {:<20}  {:<24}  User", "ID", "Name", "Email")?;
    for employee in &employees {
        writeln!(
            writer,
            "{:<36}  {:<20}  {:<24}  {}",
            employee.id.as_str(),
            employee.name,
            employee.email.as_deref().unwrap_or("-"),
            employee.user_id.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use hr_core::EmployeeId;
    use insta::assert_snapshot;

    #[test]
    fn add_stores_employee_with_user_link() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        let added = add(
            &mut out,
            &mut db,
            "  Ada Lovelace ",
            Some("ada@example.com"),
            Some("auth|ada"),
        )
        .unwrap();

        assert_eq!(added.name, "Ada Lovelace");
        let stored = db.employee_by_user("auth|ada").unwrap().unwrap();
        assert_eq!(stored, added);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Added employee Ada Lovelace ({})\n", added.id)
        );
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        assert!(add(&mut out, &mut db, "   ", None, None).is_err());
        assert!(db.employees().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_user_already_linked() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        add(&mut out, &mut db, "Ada", None, Some("auth|ada")).unwrap();
        let err = add(&mut out, &mut db, "Impostor", None, Some("auth|ada")).unwrap_err();
        assert!(err.to_string().contains("Impostor"));
        assert_eq!(db.employees().unwrap().len(), 1);
    }

    #[test]
    fn list_sorted_by_name() {
        let mut db = Database::open_in_memory().unwrap();
        let mut grace = Employee::new("Grace Hopper");
        grace.id = EmployeeId::new("emp-grace").unwrap();
        let mut ada = Employee::new("Ada Lovelace")
            .with_email("ada@example.com")
            .with_user("auth|ada");
        ada.id = EmployeeId::new("emp-ada").unwrap();
        db.insert_employee(&grace).unwrap();
        db.insert_employee(&ada).unwrap();

        let mut out = Vec::new();
        list(&mut out, &db).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        ID                                    Name                  Email                     User
        emp-ada                               Ada Lovelace          ada@example.com           auth|ada
        emp-grace                             Grace Hopper          -                         -
        ");
    }

    #[test]
    fn list_empty_directory() {
        let db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        list(&mut out, &db).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No employees."));
    }
}
