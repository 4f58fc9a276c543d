//! Static per-resource access metadata and ownership paths.

use std::collections::BTreeMap;
use std::fmt;

use crate::method::{Method, MethodSet};

/// Longest ownership path accepted at load time.
pub const MAX_PATH_HOPS: usize = 8;

/// Default field naming an item's author, used by zero-hop paths.
pub const DEFAULT_AUTHOR_FIELD: &str = "_author";

/// One step of an [`OwnershipPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop {
    /// Read an identifier field off the current item.
    Field(String),
    /// Follow the foreign key `foreign_key` to an item of type `target`.
    Relation {
        name: String,
        target: String,
        foreign_key: String,
    },
}

impl Hop {
    /// Relation hop whose foreign key follows the `{name}_id` convention.
    pub fn relation(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        let foreign_key = format!("{name}_id");
        Hop::Relation {
            name,
            target: target.into(),
            foreign_key,
        }
    }
}

/// A declared route from an item to the identifiers of its owners.
///
/// Well-formed paths are either empty (the descriptor's author field is the
/// owner) or zero or more relation hops followed by exactly one field hop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipPath {
    hops: Vec<Hop>,
}

impl OwnershipPath {
    /// An empty path to chain hops onto.
    pub fn new() -> Self {
        Self::default()
    }

    /// The zero-hop path: ownership is read from the author field.
    pub fn author() -> Self {
        Self::default()
    }

    /// Single field hop, the common direct foreign key case.
    pub fn field_only(name: impl Into<String>) -> Self {
        Self::new().field(name)
    }

    pub fn from_hops(hops: Vec<Hop>) -> Self {
        Self { hops }
    }

    /// Append a relation hop using the `{name}_id` foreign key.
    pub fn relation(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.hops.push(Hop::relation(name, target));
        self
    }

    /// Append a relation hop with an explicit foreign key field.
    pub fn relation_via(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.hops.push(Hop::Relation {
            name: name.into(),
            target: target.into(),
            foreign_key: foreign_key.into(),
        });
        self
    }

    /// Append a field hop.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.hops.push(Hop::Field(name.into()));
        self
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn is_author(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

impl fmt::Display for OwnershipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hops.is_empty() {
            return f.write_str("<author>");
        }
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match hop {
                Hop::Field(name) => f.write_str(name)?,
                Hop::Relation { name, target, .. } => write!(f, "{name}({target})")?,
            }
        }
        Ok(())
    }
}

/// Which methods a resource type opens to whom, and how its owners are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAccessDescriptor {
    pub resource: String,
    pub public_methods: MethodSet,
    pub registered_methods: MethodSet,
    pub owner_methods: MethodSet,
    /// Alternative paths; any one matching the caller grants ownership.
    pub owner_paths: Vec<OwnershipPath>,
    pub author_field: String,
}

impl ResourceAccessDescriptor {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            public_methods: MethodSet::EMPTY,
            registered_methods: MethodSet::EMPTY,
            owner_methods: MethodSet::EMPTY,
            owner_paths: Vec::new(),
            author_field: DEFAULT_AUTHOR_FIELD.to_string(),
        }
    }

    /// Methods open to anonymous callers.
    pub fn public(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.public_methods = methods.into_iter().collect();
        self
    }

    /// Methods open to any authenticated caller.
    pub fn registered(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.registered_methods = methods.into_iter().collect();
        self
    }

    /// Methods open to the owners of the targeted item.
    pub fn owner(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.owner_methods = methods.into_iter().collect();
        self
    }

    pub fn owner_path(mut self, path: OwnershipPath) -> Self {
        self.owner_paths.push(path);
        self
    }

    pub fn author_field(mut self, field: impl Into<String>) -> Self {
        self.author_field = field.into();
        self
    }
}

/// Immutable lookup of descriptors by resource name.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: BTreeMap<String, ResourceAccessDescriptor>,
}

impl DescriptorRegistry {
    pub(crate) fn from_descriptors(
        descriptors: impl IntoIterator<Item = ResourceAccessDescriptor>,
    ) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.resource.clone(), d))
                .collect(),
        }
    }

    pub fn lookup(&self, resource: &str) -> Option<&ResourceAccessDescriptor> {
        self.descriptors.get(resource)
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.descriptors.contains_key(resource)
    }

    /// Descriptors in resource-name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceAccessDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_defaults_foreign_key() {
        let path = OwnershipPath::new().relation("forward", "forwards").field("owner_id");
        assert_eq!(
            path.hops()[0],
            Hop::Relation {
                name: "forward".into(),
                target: "forwards".into(),
                foreign_key: "forward_id".into(),
            }
        );
        assert_eq!(path.to_string(), "forward(forwards).owner_id");
        assert_eq!(OwnershipPath::author().to_string(), "<author>");
    }

    #[test]
    fn chained_path_is_not_an_author_path() {
        assert!(OwnershipPath::author().is_author());
        assert_eq!(OwnershipPath::new().relation("forward", "forwards").field("owner_id").len(), 2);
        assert!(!OwnershipPath::field_only("user_id").is_author());
        assert_eq!(OwnershipPath::field_only("user_id"), OwnershipPath::new().field("user_id"));
    }

    #[test]
    fn descriptor_builder() {
        let d = ResourceAccessDescriptor::new("files")
            .registered([Method::Get])
            .owner([Method::Get, Method::Delete])
            .owner_path(OwnershipPath::author());
        assert!(d.registered_methods.contains(Method::Get));
        assert!(d.owner_methods.contains(Method::Delete));
        assert!(d.public_methods.is_empty());
        assert_eq!(d.author_field, DEFAULT_AUTHOR_FIELD);
    }
}
