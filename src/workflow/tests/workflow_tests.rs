//! Integration tests for the order workflow

use chrono::{Duration, Utc};
use orderdesk_shield::{Actor, ErrorKind, Role, Seed, Shield};
use orderdesk_workflow::{
    Capabilities, Edge, Order, OrderBook, OrderStatus, TransitionGuard, TransitionTable, WorkflowError,
};
use proptest::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

fn shield() -> Arc<Shield> {
    Arc::new(Shield::in_memory(&Seed::standard()).unwrap())
}

#[test]
fn test_full_lifecycle() {
    let guard = TransitionGuard::default();
    let mut order = Order::new();

    guard
        .apply_transition(&mut order, Role::Sale, OrderStatus::Assigned)
        .unwrap();
    guard
        .apply_transition(&mut order, Role::Weighing, OrderStatus::Weighing)
        .unwrap();
    guard
        .apply_transition(&mut order, Role::Weighing, OrderStatus::Kitchen)
        .unwrap();
    guard
        .apply_transition(&mut order, Role::Kitchen, OrderStatus::Delivery)
        .unwrap();
    guard
        .apply_transition(&mut order, Role::Sale, OrderStatus::Completed)
        .unwrap();

    assert_eq!(order.status(), OrderStatus::Completed);
    assert_eq!(order.version(), 5);
    assert_eq!(order.history().len(), 5);
    assert!(order.history().windows(2).all(|w| w[0].to == w[1].from));
}

#[test]
fn test_weighing_to_kitchen_by_role() {
    let guard = TransitionGuard::default();

    let mut order = Order::new();
    guard
        .apply_transition(&mut order, Role::Sale, OrderStatus::Weighing)
        .unwrap();

    let err = guard
        .apply_transition(&mut order, Role::Sale, OrderStatus::Kitchen)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RoleNotPermitted { .. }));
    assert_eq!(order.status(), OrderStatus::Weighing);

    guard
        .apply_transition(&mut order, Role::Weighing, OrderStatus::Kitchen)
        .unwrap();
    assert_eq!(order.status(), OrderStatus::Kitchen);
}

#[test]
fn test_missing_edge_reported_before_role() {
    let guard = TransitionGuard::default();

    // Kitchen staff are on no edge out of created, but the edge itself is
    // missing, so the error is about legality.
    let err = guard
        .check(Role::Kitchen, OrderStatus::Created, OrderStatus::Delivery)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    for role in Role::ALL {
        for status in OrderStatus::ALL {
            assert!(!guard.can_transition(role, OrderStatus::Completed, status));
            assert!(!guard.can_transition(role, OrderStatus::Cancelled, status));
        }
    }
}

#[test]
fn test_universal_roles_on_every_edge() {
    let guard = TransitionGuard::default();
    for edge in guard.table().edges() {
        assert!(guard.can_transition(Role::Admin, edge.from, edge.to));
        assert!(guard.can_transition(Role::Manager, edge.from, edge.to));
    }
}

#[test]
fn test_reweigh_keeps_first_stage_times() {
    let guard = TransitionGuard::default();
    let t0 = Utc::now();
    let mut order = Order::with_id(Uuid::new_v4(), t0);

    guard
        .apply_transition_at(&mut order, Role::Sale, None, OrderStatus::Weighing, t0)
        .unwrap();
    let t1 = t0 + Duration::minutes(10);
    guard
        .apply_transition_at(&mut order, Role::Weighing, None, OrderStatus::Kitchen, t1)
        .unwrap();
    let t2 = t0 + Duration::minutes(20);
    guard
        .apply_transition_at(&mut order, Role::Kitchen, None, OrderStatus::Weighing, t2)
        .unwrap();
    let t3 = t0 + Duration::minutes(30);
    guard
        .apply_transition_at(&mut order, Role::Weighing, None, OrderStatus::Kitchen, t3)
        .unwrap();

    assert_eq!(order.stage_started_at(OrderStatus::Weighing), Some(t0));
    assert_eq!(order.stage_started_at(OrderStatus::Kitchen), Some(t1));
    assert_eq!(order.history().len(), 4);
    assert_eq!(order.history()[3].at, t3);
}

#[test]
fn test_allowed_next_statuses() {
    let guard = TransitionGuard::default();

    let sale = guard.allowed_next_statuses(Role::Sale, OrderStatus::Created);
    assert!(sale.contains(&OrderStatus::Assigned));
    assert!(sale.contains(&OrderStatus::Weighing));
    assert!(sale.contains(&OrderStatus::Cancelled));

    let kitchen = guard.allowed_next_statuses(Role::Kitchen, OrderStatus::Kitchen);
    assert_eq!(
        kitchen.into_iter().collect::<Vec<_>>(),
        vec![OrderStatus::Weighing, OrderStatus::Delivery]
    );

    assert!(guard
        .allowed_next_statuses(Role::Weighing, OrderStatus::Delivery)
        .is_empty());
}

#[test]
fn test_reachable_statuses_match_table() {
    let guard = TransitionGuard::default();

    let weighing = guard.reachable_statuses(Role::Weighing);
    assert!(weighing.contains(&OrderStatus::Weighing));
    assert!(weighing.contains(&OrderStatus::Kitchen));
    assert!(!weighing.contains(&OrderStatus::Cancelled));

    let admin = guard.reachable_statuses(Role::Admin);
    assert!(!admin.contains(&OrderStatus::Created));
    assert_eq!(admin.len(), OrderStatus::ALL.len() - 1);
}

#[test]
fn test_custom_table_rejects_terminal_edges() {
    let result = TransitionTable::new([Edge::new(
        OrderStatus::Completed,
        OrderStatus::Created,
        [Role::Admin],
    )]);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_capabilities_for_sale() {
    let shield = shield();
    let guard = TransitionGuard::default();
    let actor = Actor::new("s-1", Role::Sale);

    let caps = Capabilities::for_actor(&shield, &guard, &actor);
    assert_eq!(caps.role, Role::Sale);
    assert!(caps.can_create_order);
    assert!(caps.allowed_statuses.contains(&OrderStatus::Completed));
    assert!(!caps.allowed_statuses.contains(&OrderStatus::Kitchen));
    assert!(caps.permissions.contains("order:change_status"));

    let json = serde_json::to_value(&caps).unwrap();
    assert_eq!(json["role"], "sale");
    assert!(json["allowed_statuses"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("completed")));
}

#[test]
fn test_capabilities_follow_overrides() {
    let shield = shield();
    let guard = TransitionGuard::default();
    let actor = Actor::new("k-1", Role::Kitchen);

    assert!(!Capabilities::for_actor(&shield, &guard, &actor).can_create_order);

    shield.grant(&actor, "order:create");
    let caps = Capabilities::for_actor(&shield, &guard, &actor);
    assert!(caps.can_create_order);
    assert!(caps.permissions.contains("order:create"));
}

#[test]
fn test_book_transitions_with_shield() {
    let shield = shield();
    let book = OrderBook::new(Arc::new(TransitionGuard::default())).with_shield(shield.clone());
    let sale = Actor::new("s-1", Role::Sale);
    let weigher = Actor::new("w-1", Role::Weighing);

    let order = book.create(&sale).unwrap();
    let order = book
        .transition(order.id(), &sale, OrderStatus::Created, OrderStatus::Weighing)
        .unwrap();
    assert_eq!(order.status(), OrderStatus::Weighing);

    let order = book
        .transition(order.id(), &weigher, OrderStatus::Weighing, OrderStatus::Kitchen)
        .unwrap();
    assert_eq!(order.history()[1].actor_id.as_deref(), Some("w-1"));
    assert_eq!(book.get(order.id()).unwrap().status(), OrderStatus::Kitchen);
}

#[test]
fn test_book_denies_without_permission() {
    let shield = shield();
    let book = OrderBook::new(Arc::new(TransitionGuard::default())).with_shield(shield.clone());
    let weigher = Actor::new("w-1", Role::Weighing);

    let err = book.create(&weigher).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(book.is_empty());

    let sale = Actor::new("s-1", Role::Sale);
    let order = book.create(&sale).unwrap();
    book.transition(order.id(), &sale, OrderStatus::Created, OrderStatus::Weighing)
        .unwrap();

    shield.revoke(&weigher, "order:change_status");
    let err = book
        .transition(order.id(), &weigher, OrderStatus::Weighing, OrderStatus::Kitchen)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Shield(_)));
    assert_eq!(book.get(order.id()).unwrap().status(), OrderStatus::Weighing);
}

#[test]
fn test_book_stale_expected_status() {
    let book = OrderBook::new(Arc::new(TransitionGuard::default()));
    let admin = Actor::new("a-1", Role::Admin);

    let order = book.create(&admin).unwrap();
    book.transition(order.id(), &admin, OrderStatus::Created, OrderStatus::Cancelled)
        .unwrap();

    let err = book
        .transition(order.id(), &admin, OrderStatus::Created, OrderStatus::Assigned)
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::StatusConflict {
            expected: OrderStatus::Created,
            actual: OrderStatus::Cancelled
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_book_unknown_order() {
    let book = OrderBook::new(Arc::new(TransitionGuard::default()));
    let admin = Actor::new("a-1", Role::Admin);

    let err = book
        .transition(Uuid::new_v4(), &admin, OrderStatus::Created, OrderStatus::Assigned)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_can_transition_matches_table(role in arb_role(), from in arb_status(), to in arb_status()) {
        let guard = TransitionGuard::default();
        let expected = guard
            .table()
            .allowed_roles(from, to)
            .map(|roles| roles.contains(&role))
            .unwrap_or(false);
        prop_assert_eq!(guard.can_transition(role, from, to), expected);
    }

    #[test]
    fn prop_random_walk_keeps_invariants(steps in prop::collection::vec((arb_role(), arb_status()), 0..40)) {
        let guard = TransitionGuard::default();
        let mut order = Order::new();
        let mut applied = 0u64;

        for (role, to) in steps {
            let from = order.status();
            let before = order.stage_started_at(to);
            match guard.apply_transition(&mut order, role, to) {
                Ok(change) => {
                    applied += 1;
                    prop_assert_eq!(change.from, from);
                    prop_assert_eq!(order.status(), to);
                    if before.is_some() {
                        prop_assert_eq!(order.stage_started_at(to), before);
                    }
                }
                Err(_) => {
                    prop_assert_eq!(order.status(), from);
                }
            }
        }

        prop_assert_eq!(order.version(), applied);
        prop_assert_eq!(order.history().len() as u64, applied);
    }
}
