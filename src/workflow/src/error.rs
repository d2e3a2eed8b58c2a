//! Error types for the order workflow

use orderdesk_shield::{ErrorKind, Role, ShieldError};
use thiserror::Error;

use crate::order::OrderId;
use crate::status::OrderStatus;

/// Order workflow errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No edge between the two statuses, for any role
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The edge exists but the role is not on it
    #[error("Role {role} is not permitted to move an order from {from} to {to}")]
    RoleNotPermitted {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order moved on before this transition was applied
    #[error("Order status changed: expected {expected}, found {actual}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// Status name outside the enumeration
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Transition table failed validation
    #[error("Invalid transition table: {0}")]
    InvalidTable(String),

    /// Permission check failed before the transition was attempted
    #[error(transparent)]
    Shield(#[from] ShieldError),
}

impl WorkflowError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::InvalidTransition { .. } | WorkflowError::StatusConflict { .. } => {
                ErrorKind::InvalidTransition
            }
            WorkflowError::RoleNotPermitted { .. } => ErrorKind::PermissionDenied,
            WorkflowError::UnknownStatus(_) | WorkflowError::OrderNotFound(_) => {
                ErrorKind::NotFound
            }
            WorkflowError::InvalidTable(_) => ErrorKind::InvalidInput,
            WorkflowError::Shield(e) => e.kind(),
        }
    }
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
