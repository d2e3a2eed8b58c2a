//! Core authorization types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShieldError};

/// Unique user identifier, supplied by the upstream auth boundary
pub type UserId = String;

/// Canonical `resource:action` permission name
pub type PermissionName = String;

/// Actor role
///
/// Closed set; every place that branches on a role matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Sale,
    Weighing,
    Kitchen,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Sale,
        Role::Weighing,
        Role::Kitchen,
    ];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Sale => "sale",
            Role::Weighing => "weighing",
            Role::Kitchen => "kitchen",
        }
    }

    /// Universal grantees pass every permission check without consulting
    /// the catalog, the role map or the override store.
    pub fn is_universal(&self) -> bool {
        match self {
            Role::Admin | Role::Manager => true,
            Role::Sale | Role::Weighing | Role::Kitchen => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ShieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "sale" => Ok(Role::Sale),
            "weighing" => Ok(Role::Weighing),
            "kitchen" => Ok(Role::Kitchen),
            _ => Err(ShieldError::RoleNotFound(s.to_string())),
        }
    }
}

/// Already-authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier
    pub id: UserId,

    /// Role the user acts under
    pub role: Role,
}

impl Actor {
    /// Create a new actor
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// Build the canonical name for a resource/action pair
pub fn permission_name(resource: &str, action: &str) -> PermissionName {
    format!("{}:{}", resource, action)
}

/// Split a canonical name into `(resource, action)`
///
/// Both halves must be non-empty and the name must contain exactly one `:`.
pub fn split_permission_name(name: &str) -> Result<(&str, &str)> {
    let mut parts = name.splitn(2, ':');
    let resource = parts.next().unwrap_or_default();
    let action = parts.next().unwrap_or_default();

    validate_segment(resource, name)?;
    validate_segment(action, name)?;

    Ok((resource, action))
}

pub(crate) fn validate_segment(segment: &str, context: &str) -> Result<()> {
    if segment.trim().is_empty() {
        return Err(ShieldError::InvalidInput(format!(
            "empty segment in permission '{}'",
            context
        )));
    }
    if segment.contains(':') || segment.chars().any(char::is_whitespace) {
        return Err(ShieldError::InvalidInput(format!(
            "permission segment '{}' must not contain ':' or whitespace",
            segment
        )));
    }
    Ok(())
}
