use std::fmt;

use serde::Serialize;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum Reason {
    Public,
    AuthenticationRequired,
    Registered,
    Owner,
    /// Granted through the named active role.
    RoleGrant(String),
    Forbidden,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Public => f.write_str("public"),
            Reason::AuthenticationRequired => f.write_str("authentication required"),
            Reason::Registered => f.write_str("registered"),
            Reason::Owner => f.write_str("owner"),
            Reason::RoleGrant(role) => write!(f, "role grant '{role}'"),
            Reason::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// Outcome of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub allow: bool,
    pub reason: Reason,
}

impl Verdict {
    pub fn allow(reason: Reason) -> Self {
        Self { allow: true, reason }
    }

    pub fn deny(reason: Reason) -> Self {
        Self {
            allow: false,
            reason,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allow
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.allow { "allow" } else { "deny" };
        write!(f, "{outcome} ({})", self.reason)
    }
}
