//! Shared, atomically replaceable policy.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use warden_core::{ConfigError, Policy, PolicyConfig};

/// Clonable handle to the active [`Policy`].
///
/// Readers take a snapshot with [`load`](Self::load) and keep it for the
/// whole decision. A reload swaps in a complete new policy; the previous one
/// stays alive until its last snapshot is dropped. Reads never lock.
#[derive(Clone)]
pub struct PolicyHandle {
    inner: Arc<ArcSwap<Policy>>,
}

impl PolicyHandle {
    pub fn new(policy: Policy) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// Parse, validate, and wrap a policy file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Policy::from_file(path).map(Self::new)
    }

    /// Current policy snapshot.
    pub fn load(&self) -> Arc<Policy> {
        self.inner.load_full()
    }

    /// Swap in `policy`, returning the one it replaced.
    pub fn replace(&self, policy: Policy) -> Arc<Policy> {
        self.inner.swap(Arc::new(policy))
    }

    /// Validate `config` and swap it in. On error the active policy is kept.
    pub fn reload_from(&self, config: PolicyConfig) -> Result<(), ConfigError> {
        let policy = config.into_policy()?;
        tracing::info!(resources = policy.descriptors().len(), "policy reloaded");
        self.replace(policy);
        Ok(())
    }

    /// Re-read a policy file. On error the active policy is kept.
    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.reload_from(PolicyConfig::from_file(path)?)
    }
}

impl From<Policy> for PolicyHandle {
    fn from(policy: Policy) -> Self {
        Self::new(policy)
    }
}
