use chrono::{DateTime, Duration, Utc};
use colored::Colorize;
use std::path::Path;
use warden_core::{AuthenticatedUser, RoleAssignment, UserId};

/// Read users and their role assignments from a YAML or JSON list.
pub fn load_assignments(path: &Path) -> Result<Vec<AuthenticatedUser>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Assignments still active at `now` that lapse within `window`, soonest first.
pub fn expiring(
    users: &[AuthenticatedUser],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<(UserId, RoleAssignment)> {
    let mut found: Vec<(UserId, RoleAssignment)> = users
        .iter()
        .flat_map(|user| {
            user.roles
                .iter()
                .filter(|a| a.expires_within(now, window))
                .map(|a| (user.id, a.clone()))
        })
        .collect();
    found.sort_by(|(a_id, a), (b_id, b)| a.expiry.cmp(&b.expiry).then(a_id.cmp(b_id)));
    found
}

pub fn run(
    path: &Path,
    within_days: i64,
    at: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if within_days < 0 {
        return Err("--within-days cannot be negative".into());
    }
    let now = match at {
        Some(at) => super::check::parse_time(at)?,
        None => Utc::now(),
    };
    let window = Duration::try_days(within_days)
        .ok_or_else(|| format!("--within-days {within_days} is out of range"))?;
    let users = load_assignments(path)?;
    let found = expiring(&users, now, window);

    if found.is_empty() {
        println!(
            "{}",
            format!("No role assignments expire within {within_days} days.").dimmed()
        );
        return Ok(());
    }

    println!(
        "  {:<10} {:<20} {}",
        "USER".dimmed(),
        "ROLE".dimmed(),
        "EXPIRES".dimmed()
    );
    println!("  {}", "-".repeat(60).dimmed());
    for (user, assignment) in &found {
        let expiry = assignment
            .expiry
            .map(|e| e.to_rfc3339())
            .unwrap_or_default();
        println!("  {:<10} {:<20} {}", user, assignment.role.cyan(), expiry.yellow());
    }
    Ok(())
}
