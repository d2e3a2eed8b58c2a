//! Static transition table
//!
//! The single source of truth for which status changes exist and which
//! roles may trigger each one. "Which stages can this role reach" is derived
//! from the same edges.

use orderdesk_shield::Role;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, WorkflowError};
use crate::status::OrderStatus;

use OrderStatus::*;
use Role::{Admin, Kitchen as KitchenStaff, Manager, Sale, Weighing as WeighingStaff};

/// Standard order lifecycle
const STANDARD_EDGES: &[(OrderStatus, OrderStatus, &[Role])] = &[
    (Created, Assigned, &[Sale, Admin, Manager]),
    (Created, Weighing, &[Sale, WeighingStaff, Admin, Manager]),
    (Created, Cancelled, &[Sale, Admin, Manager]),
    (Assigned, Weighing, &[Sale, WeighingStaff, Admin, Manager]),
    (Assigned, Cancelled, &[Sale, Admin, Manager]),
    (Weighing, Kitchen, &[WeighingStaff, Admin, Manager]),
    (Weighing, Cancelled, &[Admin, Manager]),
    // Kitchen can send an order back to be re-weighed
    (Kitchen, Weighing, &[KitchenStaff, Admin, Manager]),
    (Kitchen, Delivery, &[KitchenStaff, Admin, Manager]),
    (Kitchen, Cancelled, &[Admin, Manager]),
    (Delivery, Completed, &[Sale, Admin, Manager]),
    (Delivery, Cancelled, &[Admin, Manager]),
];

/// A legal status change and the roles allowed to trigger it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub roles: BTreeSet<Role>,
}

impl Edge {
    /// Create an edge
    pub fn new(from: OrderStatus, to: OrderStatus, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            from,
            to,
            roles: roles.into_iter().collect(),
        }
    }
}

/// Validated transition table
#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: BTreeMap<(OrderStatus, OrderStatus), BTreeSet<Role>>,
}

impl TransitionTable {
    /// Build and validate a table
    ///
    /// Rejects duplicate edges, self-loops, empty role sets, edges leaving a
    /// terminal status, and non-terminal statuses with no way out.
    pub fn new(edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut table = BTreeMap::new();

        for edge in edges {
            if edge.from == edge.to {
                return Err(WorkflowError::InvalidTable(format!(
                    "self-loop on {}",
                    edge.from
                )));
            }
            if edge.from.is_terminal() {
                return Err(WorkflowError::InvalidTable(format!(
                    "terminal status {} has an outgoing edge to {}",
                    edge.from, edge.to
                )));
            }
            if edge.roles.is_empty() {
                return Err(WorkflowError::InvalidTable(format!(
                    "edge {} -> {} has no roles",
                    edge.from, edge.to
                )));
            }
            if table.insert((edge.from, edge.to), edge.roles).is_some() {
                return Err(WorkflowError::InvalidTable(format!(
                    "duplicate edge {} -> {}",
                    edge.from, edge.to
                )));
            }
        }

        for status in OrderStatus::ALL {
            if !status.is_terminal() && !table.keys().any(|(from, _)| *from == status) {
                return Err(WorkflowError::InvalidTable(format!(
                    "non-terminal status {} has no outgoing edge",
                    status
                )));
            }
        }

        Ok(Self { edges: table })
    }

    /// The standard order lifecycle
    pub fn standard() -> Self {
        let edges = STANDARD_EDGES
            .iter()
            .map(|(from, to, roles)| Edge::new(*from, *to, roles.iter().copied()));

        match Self::new(edges) {
            Ok(table) => table,
            Err(e) => unreachable!("standard transition table is invalid: {}", e),
        }
    }

    /// Roles allowed on `from -> to`, or `None` if the edge does not exist
    pub fn allowed_roles(&self, from: OrderStatus, to: OrderStatus) -> Option<&BTreeSet<Role>> {
        self.edges.get(&(from, to))
    }

    /// Outgoing edges of a status
    pub fn outgoing(&self, from: OrderStatus) -> impl Iterator<Item = (OrderStatus, &BTreeSet<Role>)> {
        self.edges
            .iter()
            .filter(move |((edge_from, _), _)| *edge_from == from)
            .map(|((_, to), roles)| (*to, roles))
    }

    /// Every edge in the table
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges
            .iter()
            .map(|((from, to), roles)| Edge::new(*from, *to, roles.iter().copied()))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}
