//! Error types for policy loading and item lookup.

use std::fmt;

/// A single problem found while validating a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// A method list or grant names something outside GET/POST/PUT/PATCH/DELETE.
    UnknownMethod { context: String, method: String },
    /// `owner_methods` is non-empty but no ownership path is declared.
    OwnerMethodsWithoutPaths { resource: String },
    /// A dotted path uses a relation the resource does not declare.
    UndeclaredRelation { resource: String, relation: String },
    /// A relation hop points at a resource type without a descriptor.
    UnknownRelationTarget { resource: String, relation: String, target: String },
    /// A path, segment, or field name is empty or ill-formed.
    MalformedPath { resource: String, path: String, reason: String },
    /// A path is longer than the hop bound.
    PathTooLong { resource: String, path: String, hops: usize, max: usize },
    /// The author field is empty.
    EmptyAuthorField { resource: String },
    /// The role table references a resource without a descriptor.
    UnknownResource { role: String, resource: String },
    /// Two descriptors share a resource name.
    DuplicateResource { resource: String },
    /// A grant flag is neither a boolean nor 0/1.
    InvalidGrantFlag { role: String, resource: String, method: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::UnknownMethod { context, method } => {
                write!(f, "{context}: unknown method '{method}'")
            }
            ConfigIssue::OwnerMethodsWithoutPaths { resource } => {
                write!(f, "resource '{resource}': owner methods declared without an ownership path")
            }
            ConfigIssue::UndeclaredRelation { resource, relation } => {
                write!(f, "resource '{resource}': relation '{relation}' is not declared")
            }
            ConfigIssue::UnknownRelationTarget { resource, relation, target } => write!(
                f,
                "resource '{resource}': relation '{relation}' targets unknown resource '{target}'"
            ),
            ConfigIssue::MalformedPath { resource, path, reason } => {
                write!(f, "resource '{resource}': malformed ownership path '{path}': {reason}")
            }
            ConfigIssue::PathTooLong { resource, path, hops, max } => write!(
                f,
                "resource '{resource}': ownership path '{path}' has {hops} hops (max {max})"
            ),
            ConfigIssue::EmptyAuthorField { resource } => {
                write!(f, "resource '{resource}': author field cannot be empty")
            }
            ConfigIssue::UnknownResource { role, resource } => {
                write!(f, "role '{role}': unknown resource '{resource}'")
            }
            ConfigIssue::DuplicateResource { resource } => {
                write!(f, "resource '{resource}' is declared more than once")
            }
            ConfigIssue::InvalidGrantFlag { role, resource, method } => write!(
                f,
                "role '{role}': grant flag for {resource}.{method} must be a boolean or 0/1"
            ),
        }
    }
}

/// Errors raised while loading a policy. Always fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The policy file could not be read.
    Io(String),
    /// The policy document is not valid YAML or does not match the schema.
    Parse(String),
    /// The document parsed but describes an inconsistent policy.
    Validation(Vec<ConfigIssue>),
}

impl ConfigError {
    /// Validation issues, empty for I/O and parse failures.
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            ConfigError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Policy load error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Policy parse error: {msg}"),
            ConfigError::Validation(issues) => {
                write!(f, "Policy validation errors:")?;
                for issue in issues {
                    write!(f, "\n  - {issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// Failure of the storage layer behind an [`ItemLoader`](crate::loader::ItemLoader).
///
/// A missing item is not an error; loaders report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The backing store failed.
    Backend(String),
    /// The backing store did not answer in time.
    Timeout,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Backend(msg) => write!(f, "Item store error: {msg}"),
            LoadError::Timeout => write!(f, "Item store request timed out"),
        }
    }
}

impl std::error::Error for LoadError {}
