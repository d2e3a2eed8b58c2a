//! # OrderDesk Workflow
//!
//! Order status state machine with per-edge role authorization.
//!
//! ```text
//! created ──> assigned ──> weighing ──> kitchen ──> delivery ──> completed
//!    │           │            │  ^         │            │
//!    └───────────┴────────────┴──┼─────────┴────────────┴──> cancelled
//!                                └── re-weigh ─┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use orderdesk_shield::Role;
//! use orderdesk_workflow::{Order, OrderStatus, TransitionGuard};
//!
//! let guard = TransitionGuard::default();
//! let mut order = Order::new();
//!
//! guard.apply_transition(&mut order, Role::Sale, OrderStatus::Weighing).unwrap();
//! assert!(guard.apply_transition(&mut order, Role::Sale, OrderStatus::Kitchen).is_err());
//! guard.apply_transition(&mut order, Role::Weighing, OrderStatus::Kitchen).unwrap();
//! ```

pub mod book;
pub mod capabilities;
pub mod error;
pub mod guard;
pub mod order;
pub mod status;
pub mod table;

pub use book::OrderBook;
pub use capabilities::Capabilities;
pub use error::{Result, WorkflowError};
pub use guard::TransitionGuard;
pub use order::{Order, OrderId, StatusChange};
pub use status::OrderStatus;
pub use table::{Edge, TransitionTable};
