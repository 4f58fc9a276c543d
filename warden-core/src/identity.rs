use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::item::UserId;

/// A time-bounded grant of a named role to a user.
///
/// An assignment without an expiry never lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    /// An assignment that never expires.
    pub fn permanent(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            expiry: None,
        }
    }

    /// An assignment that lapses at `expiry`.
    pub fn until(role: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            role: role.into(),
            expiry: Some(expiry),
        }
    }

    /// Active iff there is no expiry or the expiry lies strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            None => true,
            Some(expiry) => expiry > now,
        }
    }

    /// Still active at `now` but lapsing no later than `now + window`.
    ///
    /// Permanent assignments never qualify. A window reaching past the
    /// representable date range has no upper bound.
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.expiry {
            Some(expiry) if expiry > now => match now.checked_add_signed(window) {
                Some(limit) => expiry <= limit,
                None => true,
            },
            _ => false,
        }
    }
}

/// The caller of an authorization decision.
///
/// Authentication happens elsewhere; implementors only expose the numeric
/// identifier and the role assignments known at decision time.
pub trait Identity: Send + Sync {
    /// Numeric user identifier, compared against resolved owners.
    fn user_id(&self) -> UserId;

    /// Role assignments, including ones that may already have expired.
    fn role_assignments(&self) -> &[RoleAssignment];
}

/// Plain identity value supplied by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            roles: Vec::new(),
        }
    }

    /// Add a permanent role assignment.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(RoleAssignment::permanent(role));
        self
    }

    /// Add a role assignment lapsing at `expiry`.
    pub fn with_role_until(mut self, role: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        self.roles.push(RoleAssignment::until(role, expiry));
        self
    }

    /// Whether the user holds `role` and it is active at `now`.
    pub fn has_active_role(&self, role: &str, now: DateTime<Utc>) -> bool {
        self.roles
            .iter()
            .any(|a| a.role == role && a.is_active_at(now))
    }
}

impl Identity for AuthenticatedUser {
    fn user_id(&self) -> UserId {
        self.id
    }

    fn role_assignments(&self) -> &[RoleAssignment] {
        &self.roles
    }
}
