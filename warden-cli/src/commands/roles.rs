use colored::Colorize;
use std::path::Path;
use warden_core::{MethodSet, Policy};

/// `(role, resource, methods)` rows, optionally restricted to one role.
pub fn rows(
    policy: &Policy,
    role: Option<&str>,
) -> Result<Vec<(String, String, MethodSet)>, String> {
    let table = policy.roles();
    let roles: Vec<&str> = match role {
        Some(role) if table.grants_for(role).is_some() => vec![role],
        Some(role) => return Err(format!("role '{role}' is not defined")),
        None => table.roles().collect(),
    };

    let mut rows = Vec::new();
    for role in roles {
        if let Some(grants) = table.grants_for(role) {
            for (resource, methods) in grants {
                if !methods.is_empty() {
                    rows.push((role.to_string(), resource.clone(), *methods));
                }
            }
        }
    }
    Ok(rows)
}

pub fn run(path: &Path, role: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let policy = super::load_policy(path)?;
    let rows = rows(&policy, role)?;

    if rows.is_empty() {
        println!("{}", "No grants defined.".dimmed());
        return Ok(());
    }

    println!(
        "  {:<18} {:<18} {}",
        "ROLE".dimmed(),
        "RESOURCE".dimmed(),
        "METHODS".dimmed()
    );
    println!("  {}", "-".repeat(70).dimmed());
    let mut last_role = String::new();
    for (role, resource, methods) in rows {
        let shown = if role == last_role {
            String::new()
        } else {
            role.clone()
        };
        println!("  {:<18} {:<18} {}", shown.cyan(), resource, methods);
        last_role = role;
    }
    Ok(())
}
