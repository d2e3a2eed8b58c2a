//! # OrderDesk Shield
//!
//! Permission resolution for the order-management backend.
//!
//! ## Features
//!
//! - **Permission catalog** of `resource:action` names
//! - **Role defaults** with admin/manager as universal grantees
//! - **Per-user overrides** that outrank role defaults in both directions
//! - **Role-decision cache** invalidated on every administrative mutation
//! - **Atomic reseed** of catalog and role map together
//! - **Tower gate** returning structured denials
//!
//! ## Example
//!
//! ```rust
//! use orderdesk_shield::{Actor, Role, Seed, Shield};
//!
//! let shield = Shield::in_memory(&Seed::standard()).unwrap();
//! let cook = Actor::new("u-42", Role::Kitchen);
//!
//! assert!(shield.can(&cook, "order:read"));
//! assert!(shield.cannot(&cook, "order:delete"));
//!
//! shield.grant(&cook, "order:delete");
//! assert!(shield.can(&cook, "order:delete"));
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod overrides;
pub mod role_map;
pub mod seed;
pub mod types;

// Re-export commonly used types
pub use catalog::{Permission, PermissionCatalog};
pub use config::{CacheConfig, ShieldConfig};
pub use engine::{CacheStats, Shield};
pub use error::{Denial, ErrorKind, Requirement, Result, ShieldError};
pub use gate::{ActorSource, RequirePermission, RequirePermissionService};
pub use overrides::{InMemoryOverrideStore, OverrideStore};
pub use role_map::RolePermissionMap;
pub use seed::{PermissionSeed, Seed};
pub use types::{Actor, PermissionName, Role, UserId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
