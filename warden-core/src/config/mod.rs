//! YAML policy documents.
//!
//! A policy file declares one entry per resource type and a role table:
//!
//! ```yaml
//! author_field: _author
//! resources:
//!   forwards:
//!     owner_methods: [GET, DELETE]
//!     owner: [owner_id]
//!   forwardusers:
//!     owner_methods: [GET, POST, PUT, PATCH, DELETE]
//!     relations:
//!       forward: { target: forwards }     # foreign key defaults to forward_id
//!     owner:
//!       - user_id
//!       - forward.owner_id
//! roles:
//!   mail-admin:
//!     forwards: { GET: 1, DELETE: 1 }
//! ```
//!
//! Owner paths come in two spellings: a dotted string resolved through the
//! `relations` table of each resource along the way, or an explicit list of
//! hops (`[{ relation: forward, target: forwards }, { field: owner_id }]`).
//! An empty list (`[]`) is the zero-hop path: the author field owns the item.

mod paths;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::descriptor::{ResourceAccessDescriptor, DEFAULT_AUTHOR_FIELD};
use crate::error::{ConfigError, ConfigIssue};
use crate::method::{Method, MethodSet};
use crate::policy::{Policy, PolicyBuilder};

fn default_author_field() -> String {
    DEFAULT_AUTHOR_FIELD.to_string()
}

/// Root of a policy document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Author field used by zero-hop paths unless a resource overrides it.
    #[serde(default = "default_author_field")]
    pub author_field: String,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,
    /// `role -> resource -> method -> flag`.
    #[serde(default)]
    pub roles: BTreeMap<String, BTreeMap<String, BTreeMap<String, GrantFlag>>>,
}

/// Access declaration for one resource type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    #[serde(default)]
    pub public_methods: Vec<String>,
    #[serde(default)]
    pub registered_methods: Vec<String>,
    #[serde(default)]
    pub owner_methods: Vec<String>,
    /// Relations usable in dotted owner paths, keyed by relation name.
    #[serde(default)]
    pub relations: BTreeMap<String, RelationConfig>,
    #[serde(default)]
    pub owner: Vec<OwnerPathConfig>,
    #[serde(default)]
    pub author_field: Option<String>,
}

/// A foreign-key reference to another resource type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationConfig {
    pub target: String,
    /// Defaults to `{relation}_id`.
    #[serde(default)]
    pub foreign_key: Option<String>,
}

/// One owner path, dotted or as explicit hops.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OwnerPathConfig {
    Dotted(String),
    Hops(Vec<HopConfig>),
}

/// An explicit hop: exactly one of `field` or `relation`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HopConfig {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<String>,
}

/// Grant flag: `true`/`1` grants, `false`/`0` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GrantFlag {
    Bool(bool),
    Int(i64),
}

impl GrantFlag {
    fn granted(self) -> Option<bool> {
        match self {
            GrantFlag::Bool(b) => Some(b),
            GrantFlag::Int(0) => Some(false),
            GrantFlag::Int(1) => Some(true),
            GrantFlag::Int(_) => None,
        }
    }
}

impl PolicyConfig {
    /// Parse a policy document from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a policy document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    /// Translate and validate into an immutable [`Policy`].
    pub fn into_policy(self) -> Result<Policy, ConfigError> {
        let mut builder = PolicyBuilder::new();

        for (name, resource) in &self.resources {
            let (descriptor, issues) = self.descriptor(name, resource);
            builder = builder.resource(descriptor);
            for issue in issues {
                builder = builder.issue(issue);
            }
        }

        for (role, resources) in self.roles {
            builder = builder.role(role.clone());
            for (resource, methods) in resources {
                let mut granted = Vec::new();
                for (method, flag) in methods {
                    let parsed = match method.parse::<Method>() {
                        Ok(m) => m,
                        Err(_) => {
                            builder = builder.issue(ConfigIssue::UnknownMethod {
                                context: format!("role '{role}' on '{resource}'"),
                                method,
                            });
                            continue;
                        }
                    };
                    match flag.granted() {
                        Some(true) => granted.push(parsed),
                        Some(false) => {}
                        None => {
                            builder = builder.issue(ConfigIssue::InvalidGrantFlag {
                                role: role.clone(),
                                resource: resource.clone(),
                                method,
                            });
                        }
                    }
                }
                builder = builder.grant(role.clone(), resource, granted);
            }
        }

        // A resource whose every owner path failed to translate already has
        // an issue per path; do not also report it as lacking paths.
        builder.build().map_err(|err| match err {
            ConfigError::Validation(issues) => ConfigError::Validation(
                issues
                    .into_iter()
                    .filter(|issue| match issue {
                        ConfigIssue::OwnerMethodsWithoutPaths { resource } => self
                            .resources
                            .get(resource)
                            .map_or(true, |r| r.owner.is_empty()),
                        _ => true,
                    })
                    .collect(),
            ),
            other => other,
        })
    }

    fn descriptor(
        &self,
        name: &str,
        resource: &ResourceConfig,
    ) -> (ResourceAccessDescriptor, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let context = format!("resource '{name}'");

        let mut descriptor = ResourceAccessDescriptor::new(name)
            .author_field(
                resource
                    .author_field
                    .clone()
                    .unwrap_or_else(|| self.author_field.clone()),
            );
        descriptor.public_methods = parse_methods(&context, &resource.public_methods, &mut issues);
        descriptor.registered_methods =
            parse_methods(&context, &resource.registered_methods, &mut issues);
        descriptor.owner_methods = parse_methods(&context, &resource.owner_methods, &mut issues);

        for path in &resource.owner {
            match paths::translate(&self.resources, name, path) {
                Ok(path) => descriptor.owner_paths.push(path),
                Err(issue) => issues.push(issue),
            }
        }

        (descriptor, issues)
    }
}

impl Policy {
    /// Parse and validate a policy from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        PolicyConfig::from_yaml_str(yaml)?.into_policy()
    }

    /// Read, parse, and validate a policy file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        PolicyConfig::from_file(path)?.into_policy()
    }
}

fn parse_methods(context: &str, names: &[String], issues: &mut Vec<ConfigIssue>) -> MethodSet {
    names
        .iter()
        .filter_map(|name| match name.parse::<Method>() {
            Ok(method) => Some(method),
            Err(_) => {
                issues.push(ConfigIssue::UnknownMethod {
                    context: context.to_string(),
                    method: name.clone(),
                });
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Hop;

    const FORWARDS: &str = r#"
resources:
  users:
    owner_methods: [GET, PATCH]
    owner: [id]
  forwards:
    owner_methods: [GET, DELETE]
    owner: [owner_id]
  forwardusers:
    owner_methods: [GET, POST, PUT, PATCH, DELETE]
    relations:
      forward: { target: forwards }
    owner:
      - user_id
      - forward.owner_id
roles:
  mail-admin:
    forwards: { GET: 1, DELETE: true, POST: 0 }
"#;

    #[test]
    fn loads_dotted_paths_through_relations() {
        let policy = Policy::from_yaml_str(FORWARDS).unwrap();
        let d = policy.lookup("forwardusers").unwrap();
        assert_eq!(d.owner_paths.len(), 2);
        assert_eq!(d.owner_paths[0].hops(), &[Hop::Field("user_id".into())]);
        assert_eq!(
            d.owner_paths[1].hops(),
            &[
                Hop::Relation {
                    name: "forward".into(),
                    target: "forwards".into(),
                    foreign_key: "forward_id".into()
                },
                Hop::Field("owner_id".into())
            ]
        );
    }

    #[test]
    fn grant_flags_accept_ints_and_bools() {
        let policy = Policy::from_yaml_str(FORWARDS).unwrap();
        let roles = policy.roles();
        assert!(roles.is_granted("mail-admin", "forwards", Method::Get));
        assert!(roles.is_granted("mail-admin", "forwards", Method::Delete));
        assert!(!roles.is_granted("mail-admin", "forwards", Method::Post));
    }

    #[test]
    fn reports_every_issue() {
        let yaml = r#"
resources:
  events:
    public_methods: [GET, FETCH]
    owner_methods: [DELETE]
roles:
  vorstand:
    widgets: { GET: 1 }
    events: { PURGE: 1, POST: 2 }
"#;
        let err = Policy::from_yaml_str(yaml).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 5, "{err}");
        assert!(issues.contains(&ConfigIssue::UnknownMethod {
            context: "resource 'events'".into(),
            method: "FETCH".into()
        }));
        assert!(issues.contains(&ConfigIssue::OwnerMethodsWithoutPaths {
            resource: "events".into()
        }));
        assert!(issues.contains(&ConfigIssue::UnknownResource {
            role: "vorstand".into(),
            resource: "widgets".into()
        }));
        assert!(issues.iter().any(|i| matches!(i, ConfigIssue::InvalidGrantFlag { .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::UnknownMethod { method, .. } if method == "PURGE")));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Policy::from_yaml_str("resources:\n  events:\n    public: [GET]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn resource_author_field_overrides_document_default() {
        let yaml = r#"
author_field: created_by
resources:
  files:
    owner_methods: [GET]
    owner: [[]]
  studydocuments:
    owner_methods: [GET]
    author_field: _author
    owner: [[]]
"#;
        let policy = Policy::from_yaml_str(yaml).unwrap();
        assert_eq!(policy.lookup("files").unwrap().author_field, "created_by");
        assert_eq!(policy.lookup("studydocuments").unwrap().author_field, "_author");
        assert!(policy.lookup("files").unwrap().owner_paths[0].is_author());
    }
}
