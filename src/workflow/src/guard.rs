//! Transition guard
//!
//! Legality first (does the edge exist), then authority (is the role on the
//! edge). The two failures are reported as different errors.

use chrono::{DateTime, Utc};
use orderdesk_shield::{Actor, Role};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};
use crate::order::{Order, StatusChange};
use crate::status::OrderStatus;
use crate::table::TransitionTable;

/// Role-gated order status state machine
#[derive(Debug, Clone, Default)]
pub struct TransitionGuard {
    table: TransitionTable,
}

impl TransitionGuard {
    /// Guard over a validated table
    pub fn new(table: TransitionTable) -> Self {
        Self { table }
    }

    /// The underlying table
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Check `from -> to` for `role`
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if no edge exists, regardless of role
    /// - `RoleNotPermitted` if the edge exists but `role` is not on it
    pub fn check(&self, role: Role, from: OrderStatus, to: OrderStatus) -> Result<()> {
        let roles = self
            .table
            .allowed_roles(from, to)
            .ok_or(WorkflowError::InvalidTransition { from, to })?;

        if !roles.contains(&role) {
            return Err(WorkflowError::RoleNotPermitted { role, from, to });
        }

        Ok(())
    }

    /// Whether `role` may move an order from `from` to `to`
    pub fn can_transition(&self, role: Role, from: OrderStatus, to: OrderStatus) -> bool {
        self.check(role, from, to).is_ok()
    }

    /// Statuses `role` may move an order into from `from`
    pub fn allowed_next_statuses(&self, role: Role, from: OrderStatus) -> BTreeSet<OrderStatus> {
        self.table
            .outgoing(from)
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(to, _)| to)
            .collect()
    }

    /// Every status `role` can move an order into from anywhere
    pub fn reachable_statuses(&self, role: Role) -> BTreeSet<OrderStatus> {
        self.table
            .edges()
            .filter(|edge| edge.roles.contains(&role))
            .map(|edge| edge.to)
            .collect()
    }

    /// Move `order` to `to` on behalf of `role`, stamping the current time
    pub fn apply_transition(
        &self,
        order: &mut Order,
        role: Role,
        to: OrderStatus,
    ) -> Result<StatusChange> {
        self.apply_transition_at(order, role, None, to, Utc::now())
    }

    /// Move `order` to `to` on behalf of `actor`, recording who did it
    pub fn apply_transition_for(
        &self,
        order: &mut Order,
        actor: &Actor,
        to: OrderStatus,
    ) -> Result<StatusChange> {
        self.apply_transition_at(order, actor.role, Some(actor.id.clone()), to, Utc::now())
    }

    /// Move `order` to `to` with an explicit timestamp
    ///
    /// A timed stage keeps the time it was first entered; re-entering it
    /// later does not move the stamp.
    pub fn apply_transition_at(
        &self,
        order: &mut Order,
        role: Role,
        actor_id: Option<String>,
        to: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange> {
        let from = order.status();

        if let Err(e) = self.check(role, from, to) {
            warn!(order = %order.id(), %role, %from, %to, "transition rejected: {}", e);
            return Err(e);
        }

        let change = order.enter(to, role, actor_id, at);
        info!(order = %order.id(), %role, %from, %to, version = order.version(), "order status changed");
        debug!(order = %order.id(), stage_started_at = ?order.stage_started_at(to), "stage times");

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_shield::ErrorKind;

    #[test]
    fn test_edge_and_role_checks() {
        let guard = TransitionGuard::default();

        assert!(guard.can_transition(Role::Weighing, OrderStatus::Weighing, OrderStatus::Kitchen));
        assert!(!guard.can_transition(Role::Sale, OrderStatus::Weighing, OrderStatus::Kitchen));

        let err = guard
            .check(Role::Sale, OrderStatus::Weighing, OrderStatus::Kitchen)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = guard
            .check(Role::Admin, OrderStatus::Created, OrderStatus::Completed)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_terminal_statuses_have_no_next() {
        let guard = TransitionGuard::default();
        for role in Role::ALL {
            assert!(guard.allowed_next_statuses(role, OrderStatus::Completed).is_empty());
            assert!(guard.allowed_next_statuses(role, OrderStatus::Cancelled).is_empty());
        }
    }

    #[test]
    fn test_failed_apply_leaves_order_untouched() {
        let guard = TransitionGuard::default();
        let mut order = Order::new();

        assert!(guard
            .apply_transition(&mut order, Role::Kitchen, OrderStatus::Delivery)
            .is_err());
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.version(), 0);
        assert!(order.history().is_empty());
    }
}
