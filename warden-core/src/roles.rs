use std::collections::BTreeMap;

use crate::method::{Method, MethodSet};

/// Static mapping `role -> resource -> methods`.
///
/// Expiry belongs to role assignments, not to this table.
#[derive(Debug, Clone, Default)]
pub struct RoleGrantTable {
    grants: BTreeMap<String, BTreeMap<String, MethodSet>>,
}

impl RoleGrantTable {
    pub(crate) fn from_grants(grants: BTreeMap<String, BTreeMap<String, MethodSet>>) -> Self {
        Self { grants }
    }

    /// Whether `role` grants `method` on `resource`.
    pub fn is_granted(&self, role: &str, resource: &str, method: Method) -> bool {
        self.grants
            .get(role)
            .and_then(|resources| resources.get(resource))
            .is_some_and(|methods| methods.contains(method))
    }

    /// Role names in sorted order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }

    /// Per-resource grants of one role.
    pub fn grants_for(&self, role: &str) -> Option<&BTreeMap<String, MethodSet>> {
        self.grants.get(role)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
