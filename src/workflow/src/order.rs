//! Order entity as seen by the workflow
//!
//! Only status, stage timestamps and status history live here; the rest of
//! the order belongs to the order service.

use chrono::{DateTime, Utc};
use orderdesk_shield::{Role, UserId};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::status::OrderStatus;

/// Unique order identifier
pub type OrderId = Uuid;

/// One applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub role: Role,
    /// Actor that triggered the change, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<UserId>,
    pub at: DateTime<Utc>,
}

/// Order workflow state
///
/// `status` can only change through
/// [`TransitionGuard::apply_transition`](crate::guard::TransitionGuard::apply_transition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    /// First entry time per timed stage; never overwritten
    stage_entered_at: BTreeMap<OrderStatus, DateTime<Utc>>,
    history: Vec<StatusChange>,
    /// Incremented on every applied transition
    version: u64,
}

impl Order {
    /// New order in the initial status
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4(), Utc::now())
    }

    /// New order with a caller-supplied id and creation time
    pub fn with_id(id: OrderId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: OrderStatus::INITIAL,
            created_at,
            stage_entered_at: BTreeMap::new(),
            history: Vec::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// When the order first entered `stage`, if it is a timed stage and has
    /// been entered
    pub fn stage_started_at(&self, stage: OrderStatus) -> Option<DateTime<Utc>> {
        self.stage_entered_at.get(&stage).copied()
    }

    /// Applied status changes, oldest first
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    pub(crate) fn enter(
        &mut self,
        to: OrderStatus,
        role: Role,
        actor_id: Option<UserId>,
        at: DateTime<Utc>,
    ) -> StatusChange {
        let change = StatusChange {
            from: self.status,
            to,
            role,
            actor_id,
            at,
        };

        if to.is_timed_stage() {
            self.stage_entered_at.entry(to).or_insert(at);
        }
        self.status = to;
        self.version += 1;
        self.history.push(change.clone());

        change
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_order_is_created() {
        let order = Order::new();
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.version(), 0);
        assert!(order.history().is_empty());
        assert!(order.stage_started_at(OrderStatus::Weighing).is_none());
    }

    #[test]
    fn test_stage_time_recorded_once() {
        let t0 = Utc::now();
        let mut order = Order::with_id(Uuid::new_v4(), t0);

        order.enter(OrderStatus::Weighing, Role::Sale, None, t0);
        order.enter(OrderStatus::Kitchen, Role::Weighing, None, t0 + Duration::minutes(5));
        order.enter(OrderStatus::Weighing, Role::Kitchen, None, t0 + Duration::minutes(9));

        assert_eq!(order.stage_started_at(OrderStatus::Weighing), Some(t0));
        assert_eq!(
            order.stage_started_at(OrderStatus::Kitchen),
            Some(t0 + Duration::minutes(5))
        );
        assert_eq!(order.version(), 3);
        assert_eq!(order.history()[2].from, OrderStatus::Kitchen);
    }

    #[test]
    fn test_untimed_stages_not_recorded() {
        let mut order = Order::new();
        order.enter(OrderStatus::Assigned, Role::Sale, Some("s-1".into()), Utc::now());
        assert!(order.stage_started_at(OrderStatus::Assigned).is_none());
        assert_eq!(order.history()[0].actor_id.as_deref(), Some("s-1"));
    }
}
