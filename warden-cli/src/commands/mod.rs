//! Command implementations for the `warden` CLI.

/// Decision evaluation: `warden check`.
///
/// Builds an identity from `--user`/`--role`, optionally loads the target
/// item and a JSON item store, and prints the verdict.
pub mod check;

/// Expiry report: `warden expiring`.
///
/// Reads user role assignments and lists those lapsing inside the window.
pub mod expiring;

/// Grant table listing: `warden roles`.
pub mod roles;

/// Policy validation: `warden validate`.
pub mod validate;

use std::path::Path;

use warden_core::Policy;

/// Load and validate the policy at `path`.
pub fn load_policy(path: &Path) -> Result<Policy, Box<dyn std::error::Error>> {
    let policy = Policy::from_file(path)?;
    tracing::debug!(
        path = %path.display(),
        resources = policy.descriptors().len(),
        "policy loaded"
    );
    Ok(policy)
}
