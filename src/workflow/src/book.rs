//! Concurrent order book
//!
//! Each order sits behind its own mutex, so transitions on one order are
//! serialized while different orders proceed in parallel.

use dashmap::DashMap;
use orderdesk_shield::{Actor, Requirement, Shield};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, WorkflowError};
use crate::guard::TransitionGuard;
use crate::order::{Order, OrderId};
use crate::status::OrderStatus;

/// Permission required to open an order when a shield is attached
pub const CREATE_PERMISSION: &str = "order:create";

/// Permission required to change status when a shield is attached
pub const CHANGE_STATUS_PERMISSION: &str = "order:change_status";

/// In-memory order store routing every status change through the guard
pub struct OrderBook {
    orders: DashMap<OrderId, Arc<Mutex<Order>>>,
    guard: Arc<TransitionGuard>,
    shield: Option<Arc<Shield>>,
}

impl OrderBook {
    /// Create an order book without permission checks
    pub fn new(guard: Arc<TransitionGuard>) -> Self {
        Self {
            orders: DashMap::new(),
            guard,
            shield: None,
        }
    }

    /// Require `order:create` / `order:change_status` from `shield` before
    /// opening orders or changing their status
    pub fn with_shield(mut self, shield: Arc<Shield>) -> Self {
        self.shield = Some(shield);
        self
    }

    /// Open a new order in the initial status
    pub fn create(&self, actor: &Actor) -> Result<Order> {
        self.require(actor, CREATE_PERMISSION)?;

        let order = Order::new();
        self.orders
            .insert(order.id(), Arc::new(Mutex::new(order.clone())));
        info!(order = %order.id(), actor = %actor.id, "order created");
        Ok(order)
    }

    /// Snapshot of an order
    pub fn get(&self, id: OrderId) -> Option<Order> {
        let cell = self.cell(id)?;
        let order = cell.lock().clone();
        Some(order)
    }

    /// Move an order from `expected_from` to `to`
    ///
    /// Fails with `StatusConflict` if another transition already moved the
    /// order away from `expected_from`, so two racing callers starting from
    /// the same status cannot both succeed.
    pub fn transition(
        &self,
        id: OrderId,
        actor: &Actor,
        expected_from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order> {
        let cell = self.cell(id).ok_or(WorkflowError::OrderNotFound(id))?;
        let mut order = cell.lock();

        if order.status() != expected_from {
            debug!(order = %id, expected = %expected_from, actual = %order.status(), "stale transition");
            return Err(WorkflowError::StatusConflict {
                expected: expected_from,
                actual: order.status(),
            });
        }

        self.require(actor, CHANGE_STATUS_PERMISSION)?;
        self.guard.apply_transition_for(&mut order, actor, to)?;

        Ok(order.clone())
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the book is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // Clone the Arc out so the map shard is not held while the order is locked.
    fn cell(&self, id: OrderId) -> Option<Arc<Mutex<Order>>> {
        self.orders.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn require(&self, actor: &Actor, permission: &str) -> Result<()> {
        if let Some(shield) = &self.shield {
            shield.require(actor, &Requirement::Permission(permission.to_string()))?;
        }
        Ok(())
    }
}
