use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::{Path, PathBuf};
use warden_core::{AuthenticatedUser, Identity, Item, MemoryLoader, Method, RoleAssignment};
use warden_engine::{Authorizer, Verdict};

/// Inputs of a single decision.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub resource: String,
    pub method: String,
    /// Anonymous when absent.
    pub user: Option<i64>,
    /// `ROLE` or `ROLE@RFC3339`.
    pub roles: Vec<String>,
    /// JSON file holding the targeted item.
    pub item: Option<PathBuf>,
    /// JSON file of related items, `{ "<resource>": [ {...}, ... ] }`.
    pub store: Option<PathBuf>,
    /// Decision time, RFC 3339. Defaults to now.
    pub at: Option<String>,
}

/// Parse `ROLE` or `ROLE@RFC3339` into an assignment.
pub fn parse_role(spec: &str) -> Result<RoleAssignment, String> {
    match spec.split_once('@') {
        Some((role, expiry)) => {
            let role = role.trim();
            if role.is_empty() {
                return Err(format!("role assignment '{spec}' has no role name"));
            }
            Ok(RoleAssignment::until(role, parse_time(expiry)?))
        }
        None if spec.trim().is_empty() => Err("empty role name".to_string()),
        None => Ok(RoleAssignment::permanent(spec.trim())),
    }
}

pub fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))
}

fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

/// Evaluate the request against the policy at `policy_path`.
pub async fn evaluate(
    policy_path: &Path,
    request: &CheckRequest,
) -> Result<Verdict, Box<dyn std::error::Error>> {
    let policy = super::load_policy(policy_path)?;
    let method: Method = request.method.parse()?;

    let store = match &request.store {
        Some(path) => MemoryLoader::from_json(read_json(path)?)?,
        None => MemoryLoader::new(),
    };
    let item = match &request.item {
        Some(path) => Some(
            Item::from_json(read_json(path)?)
                .ok_or_else(|| format!("{}: item must be a JSON object", path.display()))?,
        ),
        None => None,
    };
    let now = match &request.at {
        Some(at) => parse_time(at)?,
        None => Utc::now(),
    };

    let user = match request.user {
        Some(id) => {
            let mut user = AuthenticatedUser::new(id);
            for spec in &request.roles {
                user.roles.push(parse_role(spec)?);
            }
            Some(user)
        }
        None if !request.roles.is_empty() => {
            return Err("--role requires --user".into());
        }
        None => None,
    };

    let authorizer = Authorizer::new(policy, store);
    let verdict = authorizer
        .authorize_at(
            user.as_ref().map(|u| u as &dyn Identity),
            method,
            &request.resource,
            item.as_ref(),
            now,
        )
        .await?;
    Ok(verdict)
}

pub async fn run(
    policy_path: &Path,
    request: &CheckRequest,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let verdict = evaluate(policy_path, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    let who = match request.user {
        Some(id) => format!("user {id}"),
        None => "anonymous".to_string(),
    };
    let outcome = if verdict.allow {
        "ALLOW".green().bold()
    } else {
        "DENY".red().bold()
    };
    println!(
        "{outcome} {} {} for {who} ({})",
        request.method.to_uppercase(),
        request.resource.bold(),
        verdict.reason
    );
    Ok(())
}
