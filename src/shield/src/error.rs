//! Error types for the permission engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::{Role, UserId};

/// Error classification shared by every crate in the workspace.
///
/// Boundaries translate on the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown permission name or unknown role
    NotFound,
    /// Re-registering an existing resource:action pair
    Duplicate,
    /// No edge between two statuses, or the order already moved
    InvalidTransition,
    /// The actor is not authorized
    PermissionDenied,
    /// Malformed administrative input
    InvalidInput,
    /// Backing store failure
    Internal,
}

/// What a gate or inline check required of the actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Requirement {
    /// A single permission
    Permission(String),
    /// At least one of the permissions
    Any(Vec<String>),
    /// Every one of the permissions
    All(Vec<String>),
    /// Membership in one of the roles
    Role(Vec<Role>),
}

impl Requirement {
    /// Permission names this requirement checks (empty for role requirements)
    pub fn permissions(&self) -> Vec<&str> {
        match self {
            Requirement::Permission(name) => vec![name.as_str()],
            Requirement::Any(names) | Requirement::All(names) => {
                names.iter().map(String::as_str).collect()
            }
            Requirement::Role(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission(name) => write!(f, "{}", name),
            Requirement::Any(names) => write!(f, "any of [{}]", names.join(", ")),
            Requirement::All(names) => write!(f, "all of [{}]", names.join(", ")),
            Requirement::Role(roles) => {
                let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "role in [{}]", roles.join(", "))
            }
        }
    }
}

/// Structured permission denial handed to the calling boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// Actor that was denied
    pub actor_id: UserId,
    /// Role the actor acted under
    pub role: Role,
    /// What was required
    pub requirement: Requirement,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) requires {}",
            self.actor_id, self.role, self.requirement
        )
    }
}

/// Permission engine errors
#[derive(Debug, Error)]
pub enum ShieldError {
    /// Permission name absent from the catalog
    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    /// Role name outside the role enumeration
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// resource:action already registered
    #[error("Permission already exists: {0}")]
    DuplicatePermission(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Check evaluated false at a policy boundary
    #[error("Permission denied: {0}")]
    PermissionDenied(Denial),

    /// No authenticated actor reached the gate
    #[error("Permission denied: unauthenticated request requires {0}")]
    Unauthenticated(Requirement),

    /// Override store error
    #[error("Store error: {0}")]
    Store(String),
}

impl ShieldError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShieldError::PermissionNotFound(_) | ShieldError::RoleNotFound(_) => {
                ErrorKind::NotFound
            }
            ShieldError::DuplicatePermission(_) => ErrorKind::Duplicate,
            ShieldError::InvalidInput(_) => ErrorKind::InvalidInput,
            ShieldError::PermissionDenied(_) | ShieldError::Unauthenticated(_) => {
                ErrorKind::PermissionDenied
            }
            ShieldError::Store(_) => ErrorKind::Internal,
        }
    }

    /// The denial payload, if this is a permission denial
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            ShieldError::PermissionDenied(denial) => Some(denial),
            _ => None,
        }
    }
}

/// Result type for permission engine operations
pub type Result<T> = std::result::Result<T, ShieldError>;
