//! Default permission grants per role

use std::collections::{BTreeSet, HashMap};

use crate::types::{PermissionName, Role};

/// Role → permission edges
///
/// At most one edge per `(role, permission)`. Roles do not inherit from one
/// another; universal grantees are handled by the resolver, not here.
#[derive(Debug, Clone, Default)]
pub struct RolePermissionMap {
    edges: HashMap<Role, BTreeSet<PermissionName>>,
}

impl RolePermissionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Returns `false` if it already existed.
    pub fn grant_to_role(&mut self, role: Role, permission: &str) -> bool {
        self.edges
            .entry(role)
            .or_default()
            .insert(permission.to_string())
    }

    /// Remove an edge. Returns `false` if there was none.
    pub fn revoke_from_role(&mut self, role: Role, permission: &str) -> bool {
        match self.edges.get_mut(&role) {
            Some(permissions) => permissions.remove(permission),
            None => false,
        }
    }

    /// Exact-match edge lookup
    pub fn has_role_permission(&self, role: Role, permission: &str) -> bool {
        self.edges
            .get(&role)
            .map(|permissions| permissions.contains(permission))
            .unwrap_or(false)
    }

    /// Default permissions of a role
    pub fn permissions_for_role(&self, role: Role) -> BTreeSet<PermissionName> {
        self.edges.get(&role).cloned().unwrap_or_default()
    }

    /// Total number of edges
    pub fn len(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Whether the map has no edges
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_is_idempotent() {
        let mut map = RolePermissionMap::new();
        assert!(map.grant_to_role(Role::Sale, "order:create"));
        assert!(!map.grant_to_role(Role::Sale, "order:create"));
        assert_eq!(map.len(), 1);
        assert!(map.has_role_permission(Role::Sale, "order:create"));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut map = RolePermissionMap::new();
        map.grant_to_role(Role::Kitchen, "order:read");

        assert!(map.revoke_from_role(Role::Kitchen, "order:read"));
        assert!(!map.revoke_from_role(Role::Kitchen, "order:read"));
        assert!(!map.revoke_from_role(Role::Weighing, "order:read"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_no_inheritance_between_roles() {
        let mut map = RolePermissionMap::new();
        map.grant_to_role(Role::Sale, "order:create");

        assert!(!map.has_role_permission(Role::Admin, "order:create"));
        assert!(!map.has_role_permission(Role::Manager, "order:create"));
        assert!(map.permissions_for_role(Role::Weighing).is_empty());
    }
}
