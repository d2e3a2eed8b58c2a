//! Permission resolver
//!
//! Answers "can this actor do X" from the catalog, the role map and the
//! user override store, in that precedence order:
//!
//! ```text
//! universal role? ──yes──> allow
//!       │
//!   in catalog? ───no───> deny (fail closed)
//!       │
//!   override row? ─yes──> override value
//!       │
//!   role default [cached]
//! ```

pub mod cache;
pub mod snapshot;

pub use cache::{CacheStats, RoleDecisionCache};
pub use snapshot::PolicySnapshot;

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::Permission;
use crate::config::ShieldConfig;
use crate::error::{Denial, Requirement, Result, ShieldError};
use crate::overrides::{InMemoryOverrideStore, OverrideStore};
use crate::seed::Seed;
use crate::types::{Actor, PermissionName, Role};

/// Permission resolver ("Shield")
///
/// Share one instance behind an `Arc`; every method takes `&self`.
///
/// # Caching
///
/// Only role-default answers are cached, keyed by `(role, permission)` and
/// tagged with the snapshot generation. Override rows are read from the
/// store on every check, so a `grant`/`revoke` is visible to the very next
/// call from any holder of the same store.
pub struct Shield {
    /// Current catalog + role map
    snapshot: RwLock<Arc<PolicySnapshot>>,

    /// Per-user overrides
    overrides: Arc<dyn OverrideStore>,

    /// Role-default decision cache
    cache: Option<RoleDecisionCache>,

    /// Resolver configuration
    config: ShieldConfig,
}

impl Shield {
    /// Create a new resolver
    ///
    /// # Arguments
    ///
    /// * `config` - Resolver configuration
    /// * `seed` - Initial catalog and role defaults
    /// * `overrides` - Override store backend
    pub fn new(
        config: ShieldConfig,
        seed: &Seed,
        overrides: Arc<dyn OverrideStore>,
    ) -> Result<Self> {
        config.validate()?;
        let snapshot = PolicySnapshot::from_seed(seed, 1)?;

        let cache = if config.cache.enabled {
            Some(RoleDecisionCache::new(config.cache.clone()))
        } else {
            None
        };

        info!(
            "Shield initialized with {} permissions, {} role grants, cache={}",
            snapshot.catalog.len(),
            snapshot.roles.len(),
            config.cache.enabled
        );

        Ok(Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            overrides,
            cache,
            config,
        })
    }

    /// Resolver with default config and an in-memory override store
    pub fn in_memory(seed: &Seed) -> Result<Self> {
        Self::new(
            ShieldConfig::default(),
            seed,
            Arc::new(InMemoryOverrideStore::new()),
        )
    }

    /// Resolver configuration
    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    /// Current snapshot generation
    pub fn generation(&self) -> u64 {
        self.current().generation
    }

    // ------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------

    /// Whether `actor` holds `permission`
    ///
    /// Total: unknown permissions and store failures deny.
    pub fn can(&self, actor: &Actor, permission: &str) -> bool {
        if actor.role.is_universal() {
            debug!(actor = %actor.id, role = %actor.role, permission, "universal grant");
            return true;
        }

        let snapshot = self.current();
        self.resolve(&snapshot, actor, permission)
    }

    /// Strict complement of [`Shield::can`]
    pub fn cannot(&self, actor: &Actor, permission: &str) -> bool {
        !self.can(actor, permission)
    }

    /// Whether `actor` holds at least one of `permissions`
    pub fn has_any<I, S>(&self, actor: &Actor, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions = permissions.into_iter().peekable();
        if actor.role.is_universal() {
            return permissions.peek().is_some();
        }

        let snapshot = self.current();
        permissions.any(|p| self.resolve(&snapshot, actor, p.as_ref()))
    }

    /// Whether `actor` holds every one of `permissions`
    pub fn has_all<I, S>(&self, actor: &Actor, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if actor.role.is_universal() {
            return true;
        }

        let snapshot = self.current();
        permissions
            .into_iter()
            .all(|p| self.resolve(&snapshot, actor, p.as_ref()))
    }

    /// Every catalog permission `actor` holds
    ///
    /// Agrees with [`Shield::can`] for every catalog entry.
    pub fn effective_permissions(&self, actor: &Actor) -> BTreeSet<PermissionName> {
        let snapshot = self.current();

        if actor.role.is_universal() {
            return snapshot.catalog.names().collect();
        }

        let overrides = match self.overrides.overrides_for_user(&actor.id) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(actor = %actor.id, "override store unavailable, failing closed: {}", e);
                return BTreeSet::new();
            }
        };

        let mut effective: BTreeSet<PermissionName> = snapshot
            .roles
            .permissions_for_role(actor.role)
            .into_iter()
            .filter(|name| snapshot.catalog.contains(name))
            .collect();

        for (name, granted) in overrides {
            if !snapshot.catalog.contains(&name) {
                continue;
            }
            if granted {
                effective.insert(name);
            } else {
                effective.remove(&name);
            }
        }

        effective
    }

    /// Evaluate a requirement
    pub fn check(&self, actor: &Actor, requirement: &Requirement) -> bool {
        match requirement {
            Requirement::Permission(name) => self.can(actor, name),
            Requirement::Any(names) => self.has_any(actor, names),
            Requirement::All(names) => self.has_all(actor, names),
            Requirement::Role(roles) => roles.contains(&actor.role),
        }
    }

    /// Evaluate a requirement, turning a denial into a structured error
    pub fn require(&self, actor: &Actor, requirement: &Requirement) -> Result<()> {
        if self.check(actor, requirement) {
            return Ok(());
        }

        warn!(
            actor = %actor.id,
            role = %actor.role,
            "permission denied: requires {}",
            requirement
        );

        Err(ShieldError::PermissionDenied(Denial {
            actor_id: actor.id.clone(),
            role: actor.role,
            requirement: requirement.clone(),
        }))
    }

    // ------------------------------------------------------------------
    // Overrides
    // ------------------------------------------------------------------

    /// Grant `permission` to `actor` through an override.
    /// Returns `false` if the permission is unknown or the store failed.
    pub fn grant(&self, actor: &Actor, permission: &str) -> bool {
        self.write_override(actor, permission, true)
    }

    /// Revoke `permission` from `actor` through an override.
    /// Returns `false` if the permission is unknown or the store failed.
    pub fn revoke(&self, actor: &Actor, permission: &str) -> bool {
        self.write_override(actor, permission, false)
    }

    /// Upsert an override row
    pub fn set_override(&self, user: &str, permission: &str, granted: bool) -> Result<()> {
        self.current().catalog.lookup(permission)?;
        self.overrides.set_override(user, permission, granted)?;
        info!(user, permission, granted, "override set");
        Ok(())
    }

    /// Remove an override row, reverting the user to the role default
    ///
    /// Not checked against the catalog, so rows left behind by a reseed can
    /// still be removed.
    pub fn clear_override(&self, user: &str, permission: &str) -> Result<bool> {
        let removed = self.overrides.clear_override(user, permission)?;
        info!(user, permission, removed, "override cleared");
        Ok(removed)
    }

    /// Current override for `(user, permission)`
    pub fn override_for(&self, user: &str, permission: &str) -> Result<Option<bool>> {
        self.overrides.override_for(user, permission)
    }

    // ------------------------------------------------------------------
    // Catalog and role map administration
    // ------------------------------------------------------------------

    /// Register a new permission
    pub fn register_permission(
        &self,
        resource: &str,
        action: &str,
        description: &str,
    ) -> Result<Permission> {
        let permission =
            self.mutate(|snapshot| snapshot.catalog.register(resource, action, description))?;
        info!(permission = %permission.name(), "permission registered");
        Ok(permission)
    }

    /// Replace a permission's description
    pub fn describe_permission(&self, name: &str, description: &str) -> Result<Permission> {
        self.mutate(|snapshot| snapshot.catalog.describe(name, description))
    }

    /// Look up a permission by name
    pub fn lookup(&self, name: &str) -> Result<Permission> {
        self.current().catalog.lookup(name).cloned()
    }

    /// All permissions ordered by resource, then action
    pub fn permissions(&self) -> Vec<Permission> {
        self.current().catalog.list()
    }

    /// Add a role default. Returns `false` if the edge already existed.
    pub fn grant_to_role(&self, role: Role, permission: &str) -> Result<bool> {
        let added = self.mutate(|snapshot| {
            snapshot.catalog.lookup(permission)?;
            Ok(snapshot.roles.grant_to_role(role, permission))
        })?;
        info!(%role, permission, added, "role grant");
        Ok(added)
    }

    /// Remove a role default. Returns `false` if there was no edge.
    pub fn revoke_from_role(&self, role: Role, permission: &str) -> Result<bool> {
        let removed = self.mutate(|snapshot| {
            snapshot.catalog.lookup(permission)?;
            Ok(snapshot.roles.revoke_from_role(role, permission))
        })?;
        info!(%role, permission, removed, "role revoke");
        Ok(removed)
    }

    /// Exact-match role default lookup, bypassing the universal fast path
    pub fn has_role_permission(&self, role: Role, permission: &str) -> bool {
        self.current().roles.has_role_permission(role, permission)
    }

    /// Default permissions of a role
    pub fn permissions_for_role(&self, role: Role) -> BTreeSet<PermissionName> {
        self.current().roles.permissions_for_role(role)
    }

    /// Atomically replace the catalog and the role map
    ///
    /// The seed is validated in full first; on error nothing changes.
    pub fn reseed(&self, seed: &Seed) -> Result<()> {
        let mut next = PolicySnapshot::from_seed(seed, 0)?;

        {
            let mut current = self.snapshot.write();
            next.generation = current.generation + 1;
            *current = Arc::new(next);
        }
        self.clear_cache();

        let snapshot = self.current();
        info!(
            generation = snapshot.generation,
            "reseeded with {} permissions, {} role grants",
            snapshot.catalog.len(),
            snapshot.roles.len()
        );
        Ok(())
    }

    /// Drop every cached role decision
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
            debug!("role decision cache cleared");
        }
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(RoleDecisionCache::stats)
    }

    // Private helper methods

    fn current(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    fn resolve(&self, snapshot: &PolicySnapshot, actor: &Actor, permission: &str) -> bool {
        if !snapshot.catalog.contains(permission) {
            debug!(actor = %actor.id, permission, "unknown permission, denying");
            return false;
        }

        match self.overrides.override_for(&actor.id, permission) {
            Ok(Some(granted)) => {
                debug!(actor = %actor.id, permission, granted, "override decision");
                return granted;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(actor = %actor.id, permission, "override store unavailable, failing closed: {}", e);
                return false;
            }
        }

        let allowed = self.role_decision(snapshot, actor.role, permission);
        debug!(actor = %actor.id, role = %actor.role, permission, allowed, "role decision");
        allowed
    }

    fn role_decision(&self, snapshot: &PolicySnapshot, role: Role, permission: &str) -> bool {
        if let Some(cache) = &self.cache {
            if let Some(allowed) = cache.get(role, permission, snapshot.generation) {
                return allowed;
            }
        }

        let allowed = snapshot.roles.has_role_permission(role, permission);

        if let Some(cache) = &self.cache {
            cache.put(role, permission, snapshot.generation, allowed);
        }

        allowed
    }

    fn write_override(&self, actor: &Actor, permission: &str, granted: bool) -> bool {
        match self.set_override(&actor.id, permission, granted) {
            Ok(()) => true,
            Err(e) => {
                warn!(actor = %actor.id, permission, granted, "override not written: {}", e);
                false
            }
        }
    }

    /// Copy-on-write mutation of the snapshot; bumps the generation and
    /// clears the role cache on success.
    fn mutate<T>(&self, op: impl FnOnce(&mut PolicySnapshot) -> Result<T>) -> Result<T> {
        let out = {
            let mut current = self.snapshot.write();
            let mut next = PolicySnapshot::clone(&current);
            let out = op(&mut next)?;
            next.generation = current.generation + 1;
            *current = Arc::new(next);
            out
        };
        self.clear_cache();
        Ok(out)
    }
}
