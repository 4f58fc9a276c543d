//! Ownership path resolution.
//!
//! A path is walked left to right over a frontier of items, starting with
//! the requested item. Relation hops read a foreign key off every item in the
//! frontier and load the referenced items; the final field hop reads the
//! owner identifiers. Missing fields, dangling keys and items the store does
//! not have end the path with no owners. Only store failures are errors.

use std::collections::BTreeSet;

use warden_core::{Hop, Item, ItemLoader, OwnershipPath, ResourceAccessDescriptor, UserId};

use crate::config::EngineConfig;
use crate::error::PolicyError;

/// Resolves ownership paths against an [`ItemLoader`].
pub struct OwnershipResolver<'a> {
    loader: &'a dyn ItemLoader,
    max_hops: usize,
    max_fanout: usize,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(loader: &'a dyn ItemLoader, config: &EngineConfig) -> Self {
        Self {
            loader,
            max_hops: config.max_hops,
            max_fanout: config.max_fanout,
        }
    }

    /// Owner identifiers reachable from `item` along `path`.
    pub async fn resolve(
        &self,
        descriptor: &ResourceAccessDescriptor,
        item: &Item,
        path: &OwnershipPath,
    ) -> Result<BTreeSet<UserId>, PolicyError> {
        if path.is_author() {
            return Ok(item.ids(&descriptor.author_field).into_iter().collect());
        }

        if path.len() > self.max_hops {
            tracing::warn!(
                resource = %descriptor.resource,
                path = %path,
                max_hops = self.max_hops,
                "ownership path exceeds hop bound, failing closed"
            );
            return Ok(BTreeSet::new());
        }

        let mut frontier = vec![item.clone()];
        for hop in path.hops() {
            match hop {
                Hop::Field(name) => {
                    return Ok(frontier.iter().flat_map(|i| i.ids(name)).collect());
                }
                Hop::Relation {
                    name,
                    target,
                    foreign_key,
                } => {
                    let keys: BTreeSet<i64> =
                        frontier.iter().flat_map(|i| i.ids(foreign_key)).collect();

                    if keys.len() > self.max_fanout {
                        tracing::warn!(
                            resource = %descriptor.resource,
                            relation = %name,
                            keys = keys.len(),
                            max_fanout = self.max_fanout,
                            "relation fan-out exceeds bound, failing closed"
                        );
                        return Ok(BTreeSet::new());
                    }

                    let mut next = Vec::with_capacity(keys.len());
                    for key in keys {
                        match self.loader.load(target, key).await? {
                            Some(related) => next.push(related),
                            None => {
                                tracing::trace!(relation = %name, target = %target, key, "dangling relation key")
                            }
                        }
                    }

                    if next.is_empty() {
                        tracing::trace!(resource = %descriptor.resource, path = %path, "ownership path did not resolve");
                        return Ok(BTreeSet::new());
                    }
                    frontier = next;
                }
            }
        }

        // A validated path always ends with a field hop.
        Ok(BTreeSet::new())
    }

    /// Whether `user` is reachable from `item` along any of the descriptor's paths.
    ///
    /// Paths are tried in order and the first match wins. A store failure on
    /// one path does not hide a match on a later one; it is returned only when
    /// no path matches.
    pub async fn is_owner(
        &self,
        descriptor: &ResourceAccessDescriptor,
        item: &Item,
        user: UserId,
    ) -> Result<bool, PolicyError> {
        let mut failure = None;
        for path in &descriptor.owner_paths {
            match self.resolve(descriptor, item, path).await {
                Ok(owners) if owners.contains(&user) => {
                    tracing::trace!(resource = %descriptor.resource, path = %path, user, "ownership matched");
                    return Ok(true);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(resource = %descriptor.resource, path = %path, error = %err, "ownership lookup failed");
                    failure.get_or_insert(err);
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(false),
        }
    }
}
