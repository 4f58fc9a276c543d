//! Errors raised while evaluating a decision.

use std::fmt;

use warden_core::LoadError;

/// A decision could not be reached.
///
/// Denials are never errors; they come back as a [`Verdict`](crate::Verdict).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The requested resource type has no descriptor.
    UnknownResource(String),
    /// The item store failed while following a relation.
    Lookup(LoadError),
    /// Invalid engine configuration.
    InvalidConfig(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::UnknownResource(resource) => {
                write!(f, "No access descriptor for resource '{resource}'")
            }
            PolicyError::Lookup(err) => write!(f, "Ownership lookup failed: {err}"),
            PolicyError::InvalidConfig(msg) => write!(f, "Invalid engine config: {msg}"),
        }
    }
}

impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolicyError::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoadError> for PolicyError {
    fn from(err: LoadError) -> Self {
        PolicyError::Lookup(err)
    }
}
