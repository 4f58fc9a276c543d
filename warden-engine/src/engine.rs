//! The authorization decision engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use warden_core::{CachedLoader, Identity, Item, ItemLoader, Method, Policy};

use crate::config::EngineConfig;
use crate::error::PolicyError;
use crate::handle::PolicyHandle;
use crate::resolver::OwnershipResolver;
use crate::verdict::{Reason, Verdict};

/// Decides whether an identity may apply a method to a resource item.
///
/// Checks run in a fixed order and the first that matches decides:
///
/// 1. public method: allow, no identity needed
/// 2. no identity: deny, authentication required
/// 3. registered method: allow
/// 4. owner method, item given, caller among its owners: allow
/// 5. an active role assignment grants the method: allow with that role
/// 6. otherwise: deny
///
/// The authorizer is cheap to clone and safe to share across tasks. Each
/// decision works on a single policy snapshot, so a concurrent reload never
/// mixes two policies inside one decision.
///
/// ```ignore
/// let policy = PolicyHandle::from_file("policy.yaml")?;
/// let authorizer = Authorizer::new(policy, store);
///
/// let verdict = authorizer
///     .authorize(Some(&user), Method::Delete, "forwardusers", Some(&item))
///     .await?;
/// if !verdict.is_allowed() {
///     return Err(Forbidden(verdict.reason));
/// }
/// ```
#[derive(Clone)]
pub struct Authorizer {
    policy: PolicyHandle,
    loader: Arc<dyn ItemLoader>,
    config: EngineConfig,
}

impl Authorizer {
    /// Create an authorizer with the default [`EngineConfig`].
    pub fn new(policy: impl Into<PolicyHandle>, loader: impl ItemLoader) -> Self {
        Self {
            policy: policy.into(),
            loader: Arc::new(loader),
            config: EngineConfig::default(),
        }
    }

    /// Create an authorizer with explicit limits.
    ///
    /// When `config.cache_enabled` is set, the loader is wrapped in a
    /// [`CachedLoader`].
    pub fn with_config(
        policy: impl Into<PolicyHandle>,
        loader: impl ItemLoader,
        config: EngineConfig,
    ) -> Result<Self, PolicyError> {
        config.validate()?;
        let loader: Arc<dyn ItemLoader> = if config.cache_enabled {
            Arc::new(CachedLoader::new(loader, config.cache_ttl_secs))
        } else {
            Arc::new(loader)
        };
        Ok(Self {
            policy: policy.into(),
            loader,
            config,
        })
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide against the current time.
    pub async fn authorize(
        &self,
        identity: Option<&dyn Identity>,
        method: Method,
        resource: &str,
        item: Option<&Item>,
    ) -> Result<Verdict, PolicyError> {
        self.authorize_at(identity, method, resource, item, Utc::now())
            .await
    }

    /// Decide as of `now`. Role assignments expiring at or before `now` do
    /// not count.
    ///
    /// `item` is `None` for collection-level requests such as creating a new
    /// item; ownership is then never checked.
    pub async fn authorize_at(
        &self,
        identity: Option<&dyn Identity>,
        method: Method,
        resource: &str,
        item: Option<&Item>,
        now: DateTime<Utc>,
    ) -> Result<Verdict, PolicyError> {
        let policy = self.policy.load();
        let verdict = self
            .decide(&policy, identity, method, resource, item, now)
            .await?;
        tracing::debug!(
            resource,
            method = %method,
            user = identity.map(|i| i.user_id()),
            allow = verdict.allow,
            reason = %verdict.reason,
            "authorization decision"
        );
        Ok(verdict)
    }

    async fn decide(
        &self,
        policy: &Policy,
        identity: Option<&dyn Identity>,
        method: Method,
        resource: &str,
        item: Option<&Item>,
        now: DateTime<Utc>,
    ) -> Result<Verdict, PolicyError> {
        let descriptor = policy
            .lookup(resource)
            .ok_or_else(|| PolicyError::UnknownResource(resource.to_string()))?;

        if descriptor.public_methods.contains(method) {
            return Ok(Verdict::allow(Reason::Public));
        }

        let identity = match identity {
            Some(identity) => identity,
            None => return Ok(Verdict::deny(Reason::AuthenticationRequired)),
        };

        if descriptor.registered_methods.contains(method) {
            return Ok(Verdict::allow(Reason::Registered));
        }

        // A failed ownership lookup is held back so an active role can still grant.
        let mut lookup_failure = None;
        if let Some(item) = item {
            if descriptor.owner_methods.contains(method) {
                match self
                    .resolver()
                    .is_owner(descriptor, item, identity.user_id())
                    .await
                {
                    Ok(true) => return Ok(Verdict::allow(Reason::Owner)),
                    Ok(false) => {}
                    Err(err) => lookup_failure = Some(err),
                }
            }
        }

        for assignment in identity.role_assignments() {
            if !assignment.is_active_at(now) {
                tracing::trace!(role = %assignment.role, "skipping expired role assignment");
                continue;
            }
            if policy.roles().is_granted(&assignment.role, resource, method) {
                return Ok(Verdict::allow(Reason::RoleGrant(assignment.role.clone())));
            }
        }

        match lookup_failure {
            Some(err) => Err(err),
            None => Ok(Verdict::deny(Reason::Forbidden)),
        }
    }

    /// Whether `identity` owns `item` through any declared path of `resource`,
    /// regardless of which methods are owner-restricted.
    pub async fn is_owner(
        &self,
        identity: &dyn Identity,
        resource: &str,
        item: &Item,
    ) -> Result<bool, PolicyError> {
        let policy = self.policy.load();
        let descriptor = policy
            .lookup(resource)
            .ok_or_else(|| PolicyError::UnknownResource(resource.to_string()))?;
        self.resolver()
            .is_owner(descriptor, item, identity.user_id())
            .await
    }

    fn resolver(&self) -> OwnershipResolver<'_> {
        OwnershipResolver::new(self.loader.as_ref(), &self.config)
    }
}
