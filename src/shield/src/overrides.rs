//! Per-user permission overrides

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::Result;
use crate::types::{PermissionName, UserId};

/// Override store trait
///
/// One row per `(user, permission)`; writes replace the previous value.
/// The resolver reads through this trait on every check and never caches
/// the answer, so implementations backed by a shared database stay coherent
/// across replicas.
pub trait OverrideStore: Send + Sync {
    /// Upsert an override
    fn set_override(&self, user: &str, permission: &str, granted: bool) -> Result<()>;

    /// Remove an override, reverting the user to the role default.
    /// Returns `true` if a row was removed.
    fn clear_override(&self, user: &str, permission: &str) -> Result<bool>;

    /// Override value, `None` when the role default applies
    fn override_for(&self, user: &str, permission: &str) -> Result<Option<bool>>;

    /// Every override row belonging to a user
    fn overrides_for_user(&self, user: &str) -> Result<BTreeMap<PermissionName, bool>>;
}

/// In-memory override store implementation
pub struct InMemoryOverrideStore {
    rows: Arc<RwLock<HashMap<UserId, BTreeMap<PermissionName, bool>>>>,
}

impl InMemoryOverrideStore {
    /// Create a new in-memory override store
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryOverrideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideStore for InMemoryOverrideStore {
    fn set_override(&self, user: &str, permission: &str, granted: bool) -> Result<()> {
        let mut rows = self.rows.write();
        rows.entry(user.to_string())
            .or_default()
            .insert(permission.to_string(), granted);
        Ok(())
    }

    fn clear_override(&self, user: &str, permission: &str) -> Result<bool> {
        let mut rows = self.rows.write();
        let Some(user_rows) = rows.get_mut(user) else {
            return Ok(false);
        };

        let removed = user_rows.remove(permission).is_some();
        if user_rows.is_empty() {
            rows.remove(user);
        }
        Ok(removed)
    }

    fn override_for(&self, user: &str, permission: &str) -> Result<Option<bool>> {
        let rows = self.rows.read();
        Ok(rows
            .get(user)
            .and_then(|user_rows| user_rows.get(permission))
            .copied())
    }

    fn overrides_for_user(&self, user: &str) -> Result<BTreeMap<PermissionName, bool>> {
        let rows = self.rows.read();
        Ok(rows.get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_write_wins() {
        let store = InMemoryOverrideStore::new();
        store.set_override("u-1", "order:delete", true).unwrap();
        store.set_override("u-1", "order:delete", false).unwrap();

        assert_eq!(store.override_for("u-1", "order:delete").unwrap(), Some(false));
        assert_eq!(store.overrides_for_user("u-1").unwrap().len(), 1);
    }

    #[test]
    fn test_clear_reverts_to_none() {
        let store = InMemoryOverrideStore::new();
        store.set_override("u-1", "order:read", false).unwrap();

        assert!(store.clear_override("u-1", "order:read").unwrap());
        assert!(!store.clear_override("u-1", "order:read").unwrap());
        assert_eq!(store.override_for("u-1", "order:read").unwrap(), None);
        assert!(store.overrides_for_user("u-1").unwrap().is_empty());
    }

    #[test]
    fn test_overrides_are_per_user() {
        let store = InMemoryOverrideStore::new();
        store.set_override("u-1", "report:view", true).unwrap();

        assert_eq!(store.override_for("u-2", "report:view").unwrap(), None);
    }
}
