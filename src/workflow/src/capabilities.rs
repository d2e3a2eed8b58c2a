//! What an actor may do, for UI capability negotiation

use orderdesk_shield::{Actor, PermissionName, Role, Shield};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::book::CREATE_PERMISSION;
use crate::guard::TransitionGuard;
use crate::status::OrderStatus;

/// Capability summary for one actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub role: Role,
    /// Statuses the role can move an order into, from the transition table
    pub allowed_statuses: BTreeSet<OrderStatus>,
    pub can_create_order: bool,
    /// Effective permissions, consistent with `Shield::can`
    pub permissions: BTreeSet<PermissionName>,
}

impl Capabilities {
    /// Assemble the summary from the resolver and the guard
    pub fn for_actor(shield: &Shield, guard: &TransitionGuard, actor: &Actor) -> Self {
        Self {
            role: actor.role,
            allowed_statuses: guard.reachable_statuses(actor.role),
            can_create_order: shield.can(actor, CREATE_PERMISSION),
            permissions: shield.effective_permissions(actor),
        }
    }
}
