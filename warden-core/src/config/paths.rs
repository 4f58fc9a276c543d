use std::collections::BTreeMap;

use super::{HopConfig, OwnerPathConfig, RelationConfig, ResourceConfig};
use crate::descriptor::{Hop, OwnershipPath, MAX_PATH_HOPS};
use crate::error::ConfigIssue;

/// Turn a configured owner path into hops, resolving relation targets.
pub(super) fn translate(
    resources: &BTreeMap<String, ResourceConfig>,
    resource: &str,
    path: &OwnerPathConfig,
) -> Result<OwnershipPath, ConfigIssue> {
    match path {
        OwnerPathConfig::Dotted(dotted) => translate_dotted(resources, resource, dotted),
        OwnerPathConfig::Hops(hops) => translate_hops(resources, resource, hops),
    }
}

fn translate_dotted(
    resources: &BTreeMap<String, ResourceConfig>,
    resource: &str,
    dotted: &str,
) -> Result<OwnershipPath, ConfigIssue> {
    let malformed = |reason: &str| ConfigIssue::MalformedPath {
        resource: resource.to_string(),
        path: dotted.to_string(),
        reason: reason.to_string(),
    };

    let segments: Vec<&str> = dotted.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(malformed("empty path segment"));
    }
    if segments.len() > MAX_PATH_HOPS {
        return Err(ConfigIssue::PathTooLong {
            resource: resource.to_string(),
            path: dotted.to_string(),
            hops: segments.len(),
            max: MAX_PATH_HOPS,
        });
    }

    let (field, relations) = match segments.split_last() {
        Some(split) => split,
        None => return Err(malformed("empty path")),
    };

    let mut hops = Vec::with_capacity(segments.len());
    let mut current = resource;
    for relation in relations {
        let declared = lookup_relation(resources, resource, current, relation)?;
        hops.push(relation_hop(relation, declared));
        current = declared.target.as_str();
    }
    hops.push(Hop::Field(field.to_string()));

    Ok(OwnershipPath::from_hops(hops))
}

fn translate_hops(
    resources: &BTreeMap<String, ResourceConfig>,
    resource: &str,
    configured: &[HopConfig],
) -> Result<OwnershipPath, ConfigIssue> {
    let mut hops = Vec::with_capacity(configured.len());
    let mut current = resource.to_string();

    for hop in configured {
        match (&hop.field, &hop.relation) {
            (Some(field), None) if hop.target.is_none() && hop.foreign_key.is_none() => {
                hops.push(Hop::Field(field.clone()));
            }
            (None, Some(relation)) => {
                let next = match &hop.target {
                    Some(target) => {
                        let foreign_key = hop
                            .foreign_key
                            .clone()
                            .unwrap_or_else(|| format!("{relation}_id"));
                        hops.push(Hop::Relation {
                            name: relation.clone(),
                            target: target.clone(),
                            foreign_key,
                        });
                        target.clone()
                    }
                    None => {
                        let declared = lookup_relation(resources, resource, &current, relation)?;
                        let mut built = relation_hop(relation, declared);
                        if let (Hop::Relation { foreign_key, .. }, Some(fk)) =
                            (&mut built, &hop.foreign_key)
                        {
                            *foreign_key = fk.clone();
                        }
                        hops.push(built);
                        declared.target.clone()
                    }
                };
                current = next;
            }
            _ => {
                return Err(ConfigIssue::MalformedPath {
                    resource: resource.to_string(),
                    path: describe(configured),
                    reason: "each hop needs exactly one of 'field' or 'relation'".to_string(),
                })
            }
        }
    }

    Ok(OwnershipPath::from_hops(hops))
}

fn lookup_relation<'a>(
    resources: &'a BTreeMap<String, ResourceConfig>,
    origin: &str,
    current: &str,
    relation: &str,
) -> Result<&'a RelationConfig, ConfigIssue> {
    let owner = resources.get(current).ok_or_else(|| ConfigIssue::UnknownRelationTarget {
        resource: origin.to_string(),
        relation: relation.to_string(),
        target: current.to_string(),
    })?;
    owner
        .relations
        .get(relation)
        .ok_or_else(|| ConfigIssue::UndeclaredRelation {
            resource: current.to_string(),
            relation: relation.to_string(),
        })
}

fn relation_hop(name: &str, declared: &RelationConfig) -> Hop {
    Hop::Relation {
        name: name.to_string(),
        target: declared.target.clone(),
        foreign_key: declared
            .foreign_key
            .clone()
            .unwrap_or_else(|| format!("{name}_id")),
    }
}

fn describe(hops: &[HopConfig]) -> String {
    let parts: Vec<String> = hops
        .iter()
        .map(|h| match (&h.field, &h.relation) {
            (Some(f), None) => f.clone(),
            (None, Some(r)) => r.clone(),
            _ => "?".to_string(),
        })
        .collect();
    parts.join(".")
}
