//! The validated, immutable policy: descriptors plus role grants.

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::{
    DescriptorRegistry, Hop, OwnershipPath, ResourceAccessDescriptor, MAX_PATH_HOPS,
};
use crate::error::{ConfigError, ConfigIssue};
use crate::method::{Method, MethodSet};
use crate::roles::RoleGrantTable;

/// Descriptor registry and role grant table, validated together.
///
/// A `Policy` can only be obtained through [`PolicyBuilder::build`] (or the
/// YAML loader, which goes through it), so every instance is consistent.
#[derive(Debug, Clone)]
pub struct Policy {
    descriptors: DescriptorRegistry,
    roles: RoleGrantTable,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    pub fn descriptors(&self) -> &DescriptorRegistry {
        &self.descriptors
    }

    pub fn roles(&self) -> &RoleGrantTable {
        &self.roles
    }

    /// Shorthand for `descriptors().lookup(resource)`.
    pub fn lookup(&self, resource: &str) -> Option<&ResourceAccessDescriptor> {
        self.descriptors.lookup(resource)
    }
}

/// Collects descriptors and grants, then validates them as a whole.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    descriptors: Vec<ResourceAccessDescriptor>,
    grants: BTreeMap<String, BTreeMap<String, MethodSet>>,
    issues: Vec<ConfigIssue>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, descriptor: ResourceAccessDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Grant `methods` on `resource` to `role`. Repeated grants accumulate.
    pub fn grant(
        mut self,
        role: impl Into<String>,
        resource: impl Into<String>,
        methods: impl IntoIterator<Item = Method>,
    ) -> Self {
        let entry = self
            .grants
            .entry(role.into())
            .or_default()
            .entry(resource.into())
            .or_default();
        for method in methods {
            entry.insert(method);
        }
        self
    }

    /// Declare a role with no grants (keeps it visible for introspection).
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.grants.entry(role.into()).or_default();
        self
    }

    /// Record a problem found before the policy reached the builder.
    pub(crate) fn issue(mut self, issue: ConfigIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Validate and freeze the policy.
    ///
    /// All issues are reported together; any issue rejects the whole policy.
    pub fn build(self) -> Result<Policy, ConfigError> {
        let PolicyBuilder {
            descriptors,
            grants,
            mut issues,
        } = self;

        let mut seen = BTreeSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.resource.as_str()) {
                issues.push(ConfigIssue::DuplicateResource {
                    resource: descriptor.resource.clone(),
                });
            }
        }

        for descriptor in &descriptors {
            validate_descriptor(descriptor, &seen, &mut issues);
        }

        for (role, resources) in &grants {
            for resource in resources.keys() {
                if !seen.contains(resource.as_str()) {
                    issues.push(ConfigIssue::UnknownResource {
                        role: role.clone(),
                        resource: resource.clone(),
                    });
                }
            }
        }

        if !issues.is_empty() {
            return Err(ConfigError::Validation(issues));
        }

        tracing::debug!(
            resources = descriptors.len(),
            roles = grants.len(),
            "policy validated"
        );

        Ok(Policy {
            descriptors: DescriptorRegistry::from_descriptors(descriptors),
            roles: RoleGrantTable::from_grants(grants),
        })
    }
}

fn validate_descriptor(
    descriptor: &ResourceAccessDescriptor,
    known: &BTreeSet<&str>,
    issues: &mut Vec<ConfigIssue>,
) {
    let resource = &descriptor.resource;

    if descriptor.author_field.trim().is_empty() {
        issues.push(ConfigIssue::EmptyAuthorField {
            resource: resource.clone(),
        });
    }

    if !descriptor.owner_methods.is_empty() && descriptor.owner_paths.is_empty() {
        issues.push(ConfigIssue::OwnerMethodsWithoutPaths {
            resource: resource.clone(),
        });
    }

    for path in &descriptor.owner_paths {
        validate_path(resource, path, known, issues);
    }
}

fn validate_path(
    resource: &str,
    path: &OwnershipPath,
    known: &BTreeSet<&str>,
    issues: &mut Vec<ConfigIssue>,
) {
    let malformed = |reason: &str| ConfigIssue::MalformedPath {
        resource: resource.to_string(),
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.len() > MAX_PATH_HOPS {
        issues.push(ConfigIssue::PathTooLong {
            resource: resource.to_string(),
            path: path.to_string(),
            hops: path.len(),
            max: MAX_PATH_HOPS,
        });
        return;
    }

    let last = path.len().saturating_sub(1);
    for (i, hop) in path.hops().iter().enumerate() {
        match hop {
            Hop::Field(name) => {
                if name.trim().is_empty() {
                    issues.push(malformed("empty field name"));
                }
                if i != last {
                    issues.push(malformed("a field hop must be the last hop"));
                }
            }
            Hop::Relation {
                name,
                target,
                foreign_key,
            } => {
                if name.trim().is_empty() || foreign_key.trim().is_empty() {
                    issues.push(malformed("empty relation name"));
                }
                if i == last {
                    issues.push(malformed("path must end with a field hop"));
                }
                if !known.contains(target.as_str()) {
                    issues.push(ConfigIssue::UnknownRelationTarget {
                        resource: resource.to_string(),
                        relation: name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwards() -> ResourceAccessDescriptor {
        ResourceAccessDescriptor::new("forwards")
            .owner([Method::Get, Method::Delete])
            .owner_path(OwnershipPath::field_only("owner_id"))
    }

    #[test]
    fn builds_consistent_policy() {
        let policy = Policy::builder()
            .resource(forwards())
            .resource(
                ResourceAccessDescriptor::new("forwardusers")
                    .owner([Method::Delete])
                    .owner_path(OwnershipPath::field_only("user_id"))
                    .owner_path(
                        OwnershipPath::new()
                            .relation("forward", "forwards")
                            .field("owner_id"),
                    ),
            )
            .grant("mail-admin", "forwards", [Method::Get])
            .build()
            .unwrap();

        assert_eq!(policy.descriptors().len(), 2);
        assert!(policy.roles().is_granted("mail-admin", "forwards", Method::Get));
        assert!(policy.lookup("forwardusers").is_some());
    }

    #[test]
    fn empty_policy_comes_from_the_builder() {
        let policy = PolicyBuilder::new().build().unwrap();
        assert!(policy.descriptors().is_empty());
        assert!(policy.lookup("forwards").is_none());
        assert_eq!(policy.roles().roles().count(), 0);
    }

    #[test]
    fn owner_methods_require_paths() {
        let err = Policy::builder()
            .resource(ResourceAccessDescriptor::new("sessions").owner([Method::Get]))
            .build()
            .unwrap_err();
        assert_eq!(
            err.issues(),
            &[ConfigIssue::OwnerMethodsWithoutPaths {
                resource: "sessions".into()
            }]
        );
    }

    #[test]
    fn paths_without_owner_methods_are_inert_but_legal() {
        let policy = Policy::builder()
            .resource(
                ResourceAccessDescriptor::new("users")
                    .owner_path(OwnershipPath::field_only("id")),
            )
            .build();
        assert!(policy.is_ok());
    }

    #[test]
    fn rejects_trailing_relation_and_unknown_target() {
        let err = Policy::builder()
            .resource(
                ResourceAccessDescriptor::new("files")
                    .owner([Method::Get])
                    .owner_path(OwnershipPath::new().relation("study_doc", "studydocuments")),
            )
            .build()
            .unwrap_err();
        let issues = err.issues();
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::MalformedPath { .. })));
        assert!(issues.iter().any(|i| matches!(
            i,
            ConfigIssue::UnknownRelationTarget { target, .. } if target == "studydocuments"
        )));
    }

    #[test]
    fn rejects_overlong_paths() {
        let mut path = OwnershipPath::new();
        for _ in 0..MAX_PATH_HOPS {
            path = path.relation("parent", "nodes");
        }
        let path = path.field("owner_id");
        let err = Policy::builder()
            .resource(ResourceAccessDescriptor::new("nodes").owner([Method::Get]).owner_path(path))
            .build()
            .unwrap_err();
        assert!(matches!(
            err.issues(),
            [ConfigIssue::PathTooLong { hops: 9, max: 8, .. }]
        ));
    }

    #[test]
    fn rejects_grants_on_unknown_resources() {
        let err = Policy::builder()
            .resource(forwards())
            .grant("vorstand", "widgets", [Method::Get])
            .build()
            .unwrap_err();
        assert_eq!(
            err.issues(),
            &[ConfigIssue::UnknownResource {
                role: "vorstand".into(),
                resource: "widgets".into()
            }]
        );
    }

    #[test]
    fn rejects_duplicate_resources() {
        let err = Policy::builder()
            .resource(forwards())
            .resource(forwards())
            .build()
            .unwrap_err();
        assert!(matches!(
            err.issues(),
            [ConfigIssue::DuplicateResource { .. }]
        ));
    }
}
