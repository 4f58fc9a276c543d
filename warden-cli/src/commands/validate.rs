use colored::Colorize;
use std::path::Path;
use warden_core::{ConfigError, Policy, PolicyConfig};

/// Parse and validate the policy file, returning every issue on failure.
pub fn check_file(path: &Path) -> Result<Policy, ConfigError> {
    PolicyConfig::from_file(path)?.into_policy()
}

/// One summary line per resource, in resource-name order.
pub fn describe(policy: &Policy) -> Vec<String> {
    policy
        .descriptors()
        .iter()
        .map(|d| {
            let paths: Vec<String> = d.owner_paths.iter().map(|p| p.to_string()).collect();
            format!(
                "{:<18} public={} registered={} owner={} paths=[{}]",
                d.resource,
                d.public_methods,
                d.registered_methods,
                d.owner_methods,
                paths.join(", ")
            )
        })
        .collect()
}

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match check_file(path) {
        Ok(policy) => {
            println!(
                "{} {} ({} resources, {} roles)",
                "✓".green(),
                path.display().to_string().bold(),
                policy.descriptors().len(),
                policy.roles().len()
            );
            println!();
            for line in describe(&policy) {
                println!("  {line}");
            }
            Ok(())
        }
        Err(ConfigError::Validation(issues)) => {
            println!("{} {}", "✗".red(), path.display().to_string().bold());
            for issue in &issues {
                println!("  {} {issue}", "-".red());
            }
            Err(format!("{} validation issue(s)", issues.len()).into())
        }
        Err(err) => Err(err.into()),
    }
}
