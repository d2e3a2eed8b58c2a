//! Subcommand handlers
//!
//! Each handler returns the text to print so it can be tested without a
//! terminal.

use anyhow::{Context, Result};
use orderdesk_shield::{Actor, Role, Shield};
use orderdesk_workflow::{Capabilities, Order, OrderStatus, TransitionGuard};
use serde_json::json;

/// Per-user overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub grant: Vec<String>,
    pub revoke: Vec<String>,
}

impl Overrides {
    /// Record the overrides for `actor`
    ///
    /// Revocations are applied after grants, so naming a permission in both
    /// denies it.
    pub fn apply(&self, shield: &Shield, actor: &Actor) -> Result<()> {
        for permission in &self.grant {
            shield
                .set_override(&actor.id, permission, true)
                .with_context(|| format!("Cannot grant {}", permission))?;
        }
        for permission in &self.revoke {
            shield
                .set_override(&actor.id, permission, false)
                .with_context(|| format!("Cannot revoke {}", permission))?;
        }
        Ok(())
    }
}

pub fn can(shield: &Shield, actor: &Actor, overrides: &Overrides, permission: &str) -> Result<String> {
    shield.lookup(permission)?;
    overrides.apply(shield, actor)?;

    let allowed = shield.can(actor, permission);
    let user_override = shield.override_for(&actor.id, permission)?;
    pretty(&json!({
        "user": actor.id,
        "role": actor.role,
        "permission": permission,
        "allowed": allowed,
        "override": user_override,
    }))
}

pub fn effective(shield: &Shield, actor: &Actor, overrides: &Overrides) -> Result<String> {
    overrides.apply(shield, actor)?;
    pretty(&shield.effective_permissions(actor))
}

pub fn permissions(shield: &Shield, role: Option<Role>) -> Result<String> {
    match role {
        Some(role) => pretty(&shield.permissions_for_role(role)),
        None => pretty(&shield.permissions()),
    }
}

pub fn transitions(guard: &TransitionGuard, role: Role, from: Option<OrderStatus>) -> Result<String> {
    match from {
        Some(from) => pretty(&guard.allowed_next_statuses(role, from)),
        None => {
            let edges: Vec<_> = guard
                .table()
                .edges()
                .filter(|edge| edge.roles.contains(&role))
                .map(|edge| json!({ "from": edge.from, "to": edge.to }))
                .collect();
            pretty(&edges)
        }
    }
}

pub fn capabilities(
    shield: &Shield,
    guard: &TransitionGuard,
    actor: &Actor,
    overrides: &Overrides,
) -> Result<String> {
    overrides.apply(shield, actor)?;
    pretty(&Capabilities::for_actor(shield, guard, actor))
}

/// Walk a fresh order through `path`, stopping at the first rejected step
pub fn simulate(guard: &TransitionGuard, actor: &Actor, path: &[OrderStatus]) -> Result<String> {
    let mut order = Order::new();

    for to in path {
        guard
            .apply_transition_for(&mut order, actor, *to)
            .with_context(|| format!("Step to {} rejected", to))?;
    }

    pretty(&order)
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to render output")
}
