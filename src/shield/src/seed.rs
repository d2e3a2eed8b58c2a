//! Seed data for the catalog and the role map
//!
//! A reseed replaces both as a unit. Seeds are validated in full before
//! anything is swapped in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::PermissionCatalog;
use crate::error::{Result, ShieldError};
use crate::role_map::RolePermissionMap;
use crate::types::{PermissionName, Role};

/// One catalog entry in a seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSeed {
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub description: String,
}

/// Full catalog plus role defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Catalog entries
    #[serde(default)]
    pub permissions: Vec<PermissionSeed>,

    /// Role name → default permission names
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<PermissionName>>,
}

const STANDARD_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("order", "create", "Create new orders"),
    ("order", "read", "View orders"),
    ("order", "update", "Update order information"),
    ("order", "delete", "Delete orders"),
    ("order", "change_status", "Change order status"),
    ("order", "assign_users", "Assign users to orders"),
    ("order", "upload_image", "Upload order images"),
    ("order", "delete_image", "Delete order images"),
    ("order", "view_all", "View all orders, not just assigned ones"),
    ("comment", "create", "Create comments on orders"),
    ("comment", "read", "Read comments"),
    ("comment", "update", "Update own comments"),
    ("comment", "delete", "Delete own comments"),
    ("comment", "delete_any", "Delete any comment"),
    ("user", "create", "Create new users"),
    ("user", "read", "View users"),
    ("user", "update", "Update users"),
    ("user", "delete", "Delete users"),
    ("user", "manage_permissions", "Manage user permissions"),
    ("product", "create", "Create products"),
    ("product", "read", "View products"),
    ("product", "update", "Update products"),
    ("product", "delete", "Delete products"),
    ("report", "view", "View reports"),
    ("report", "export", "Export reports"),
];

const MANAGER_PERMISSIONS: &[&str] = &[
    "order:create",
    "order:read",
    "order:update",
    "order:delete",
    "order:change_status",
    "order:assign_users",
    "order:upload_image",
    "order:delete_image",
    "order:view_all",
    "comment:create",
    "comment:read",
    "comment:update",
    "comment:delete",
    "comment:delete_any",
    "product:create",
    "product:read",
    "product:update",
    "product:delete",
    "report:view",
    "report:export",
    "user:read",
];

const SALE_PERMISSIONS: &[&str] = &[
    "order:create",
    "order:read",
    "order:update",
    "order:change_status",
    "order:assign_users",
    "order:upload_image",
    "comment:create",
    "comment:read",
    "comment:update",
    "comment:delete",
    "product:read",
    "user:read",
];

// Weighing and kitchen staff share the same floor-level defaults.
const STATION_PERMISSIONS: &[&str] = &[
    "order:read",
    "order:change_status",
    "order:upload_image",
    "comment:create",
    "comment:read",
    "product:read",
];

impl Seed {
    /// Built-in catalog and role defaults
    pub fn standard() -> Self {
        let permissions: Vec<PermissionSeed> = STANDARD_PERMISSIONS
            .iter()
            .map(|(resource, action, description)| PermissionSeed {
                resource: resource.to_string(),
                action: action.to_string(),
                description: description.to_string(),
            })
            .collect();

        let all: Vec<PermissionName> = permissions
            .iter()
            .map(|p| format!("{}:{}", p.resource, p.action))
            .collect();

        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut roles = BTreeMap::new();
        for role in Role::ALL {
            let defaults = match role {
                Role::Admin => all.clone(),
                Role::Manager => owned(MANAGER_PERMISSIONS),
                Role::Sale => owned(SALE_PERMISSIONS),
                Role::Weighing | Role::Kitchen => owned(STATION_PERMISSIONS),
            };
            roles.insert(role.as_str().to_string(), defaults);
        }

        Self { permissions, roles }
    }

    /// Parse a seed from TOML
    ///
    /// ```toml
    /// [[permissions]]
    /// resource = "order"
    /// action = "read"
    ///
    /// [roles]
    /// kitchen = ["order:read"]
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ShieldError::InvalidInput(format!("invalid seed: {}", e)))
    }

    /// Parse a seed from JSON
    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| ShieldError::InvalidInput(format!("invalid seed: {}", e)))
    }

    /// Build the catalog and role map this seed describes
    ///
    /// Fails on the first duplicate permission, unknown role, or role entry
    /// naming a permission outside the seed's catalog.
    pub fn build(&self) -> Result<(PermissionCatalog, RolePermissionMap)> {
        let mut catalog = PermissionCatalog::new();
        for entry in &self.permissions {
            catalog.register(&entry.resource, &entry.action, &entry.description)?;
        }

        let mut role_map = RolePermissionMap::new();
        for (role_name, names) in &self.roles {
            let role: Role = role_name.parse()?;
            for name in names {
                catalog.lookup(name)?;
                role_map.grant_to_role(role, name);
            }
        }

        Ok((catalog, role_map))
    }
}
