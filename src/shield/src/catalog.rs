//! Permission catalog
//!
//! The universe of `resource:action` names. A name missing from the catalog
//! never resolves to a grant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, ShieldError};
use crate::types::{permission_name, validate_segment, PermissionName};

/// A named capability unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Resource (e.g., "order")
    pub resource: String,

    /// Action (e.g., "create")
    pub action: String,

    /// Free-text description, the only mutable field
    #[serde(default)]
    pub description: String,
}

impl Permission {
    /// Create a permission after validating both segments
    pub fn new(
        resource: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let resource = resource.into();
        let action = action.into();
        let name = permission_name(&resource, &action);
        validate_segment(&resource, &name)?;
        validate_segment(&action, &name)?;

        Ok(Self {
            resource,
            action,
            description: description.into(),
        })
    }

    /// Canonical `resource:action` name
    pub fn name(&self) -> PermissionName {
        permission_name(&self.resource, &self.action)
    }
}

/// Registered permissions, keyed by `(resource, action)`
///
/// The key ordering gives `list()` its stable resource-then-action order.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: BTreeMap<(String, String), Permission>,
}

impl PermissionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new permission
    pub fn register(
        &mut self,
        resource: &str,
        action: &str,
        description: &str,
    ) -> Result<Permission> {
        let permission = Permission::new(resource, action, description)?;
        let key = (permission.resource.clone(), permission.action.clone());

        if self.entries.contains_key(&key) {
            return Err(ShieldError::DuplicatePermission(permission.name()));
        }

        self.entries.insert(key, permission.clone());
        Ok(permission)
    }

    /// Look up a permission by canonical name
    pub fn lookup(&self, name: &str) -> Result<&Permission> {
        name.split_once(':')
            .and_then(|(resource, action)| {
                self.entries.get(&(resource.to_string(), action.to_string()))
            })
            .ok_or_else(|| ShieldError::PermissionNotFound(name.to_string()))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Replace a permission's description
    pub fn describe(&mut self, name: &str, description: &str) -> Result<Permission> {
        let (resource, action) = name
            .split_once(':')
            .ok_or_else(|| ShieldError::PermissionNotFound(name.to_string()))?;

        let permission = self
            .entries
            .get_mut(&(resource.to_string(), action.to_string()))
            .ok_or_else(|| ShieldError::PermissionNotFound(name.to_string()))?;

        permission.description = description.to_string();
        Ok(permission.clone())
    }

    /// All permissions ordered by resource, then action
    pub fn list(&self) -> Vec<Permission> {
        self.entries.values().cloned().collect()
    }

    /// All canonical names, in `list()` order
    pub fn names(&self) -> impl Iterator<Item = PermissionName> + '_ {
        self.entries.values().map(Permission::name)
    }

    /// Number of registered permissions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
