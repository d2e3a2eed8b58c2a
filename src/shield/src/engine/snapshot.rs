//! Immutable catalog + role map pair

use crate::catalog::PermissionCatalog;
use crate::error::Result;
use crate::role_map::RolePermissionMap;
use crate::seed::Seed;

/// Catalog and role defaults as one unit
///
/// Readers hold an `Arc` to a snapshot for the duration of a check, so a
/// reseed is observed either entirely or not at all.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    pub catalog: PermissionCatalog,
    pub roles: RolePermissionMap,
    /// Bumped on every administrative mutation
    pub generation: u64,
}

impl PolicySnapshot {
    /// Build a snapshot from a seed
    pub fn from_seed(seed: &Seed, generation: u64) -> Result<Self> {
        let (catalog, roles) = seed.build()?;
        Ok(Self {
            catalog,
            roles,
            generation,
        })
    }
}
