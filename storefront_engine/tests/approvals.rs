//! The order state machine: approval with its one-shot stock ledger, shortfall policies,
//! concurrent approval races, and generic status updates.

mod common;

use std::sync::Arc;

use chrono::Utc;
use storefront_engine::{
    db_types::{Actor, OrderStatus},
    events::EventProducers,
    order_objects::{CartLine, CartSnapshot, NewOrderRequest},
    policies::{StockShortfallPolicy, TransitionPolicy},
    traits::FulfillmentError,
    NotificationApi,
    OrderFlowApi,
    OrderFlowError,
    OrderQueryApi,
    SqliteDatabase,
};

struct Fixture {
    db: SqliteDatabase,
    user: i64,
    admin: Actor,
    product: i64,
    variant: i64,
}

/// One product with one variant, both counters at the given stock level.
async fn fixture(stock: i64) -> Fixture {
    let db = common::prepare_test_db().await;
    let user = common::seed_user(db.pool(), "alice").await;
    let admin_id = common::seed_user(db.pool(), "admin").await;
    let product = common::seed_product(db.pool(), "Trail Shoe", stock).await;
    let variant = common::seed_variant(db.pool(), product, "SHOE-41", "100.00", stock).await;
    Fixture { db, user, admin: Actor::new(admin_id, "admin"), product, variant }
}

async fn place(api: &OrderFlowApi<SqliteDatabase>, user: i64, variant: i64, quantity: u32) -> i64 {
    let cart = CartSnapshot::new(vec![CartLine { variant_id: variant, unit_price: "100.00".parse().unwrap(), quantity }]);
    let request = NewOrderRequest { user_id: user, address_id: 1, cart, coupon_code: None };
    api.place_order(request, Utc::now()).await.expect("Error placing order").order.id
}

#[tokio::test]
async fn approval_decrements_both_stock_counters_exactly_once() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());
    let order_id = place(&api, f.user, f.variant, 3).await;

    let approved = api.approve_order(order_id, &f.admin).await.unwrap();

    assert_eq!(approved.order.order_status, OrderStatus::Approved);
    assert_eq!(approved.order.approved_by, Some(f.admin.id));
    assert!(approved.ledger.fully_applied());
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);
    assert_eq!(common::product_stock(f.db.pool(), f.product).await, 2);
}

#[tokio::test]
async fn reapproving_fails_and_never_double_decrements() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());
    let order_id = place(&api, f.user, f.variant, 3).await;
    api.approve_order(order_id, &f.admin).await.unwrap();

    let err = api.approve_order(order_id, &f.admin).await.unwrap_err();
    assert!(matches!(
        err,
        OrderFlowError::Database(FulfillmentError::InvalidTransition { from: OrderStatus::Approved, .. })
    ));
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);
    assert_eq!(common::product_stock(f.db.pool(), f.product).await, 2);
}

#[tokio::test]
async fn approving_a_missing_order_fails() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());
    let err = api.approve_order(424_242, &f.admin).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::Database(FulfillmentError::OrderNotFound(424_242))));
}

/// The documented (and deliberately preserved) shortfall behaviour: a counter that cannot cover
/// the quantity is silently left unchanged, and the approval still succeeds.
#[tokio::test]
async fn short_stock_is_skipped_silently_by_default() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());

    let first = place(&api, f.user, f.variant, 3).await;
    api.approve_order(first, &f.admin).await.unwrap();
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);

    // Only 2 left; an approved order for 4 leaves the counters exactly where they were.
    let second = place(&api, f.user, f.variant, 4).await;
    let approved = api.approve_order(second, &f.admin).await.unwrap();
    assert_eq!(approved.order.order_status, OrderStatus::Approved);
    assert!(!approved.ledger.fully_applied());
    assert!(!approved.ledger.entries[0].variant_decremented);
    assert!(!approved.ledger.entries[0].product_decremented);
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);
    assert_eq!(common::product_stock(f.db.pool(), f.product).await, 2);
}

#[tokio::test]
async fn reject_policy_rolls_back_the_whole_approval() {
    let f = fixture(2).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default())
        .with_stock_policy(StockShortfallPolicy::Reject);
    let order_id = place(&api, f.user, f.variant, 4).await;

    let err = api.approve_order(order_id, &f.admin).await.unwrap_err();
    assert!(matches!(
        err,
        OrderFlowError::Database(FulfillmentError::InsufficientStock { requested: 4, available: 2, .. })
    ));

    // The status flip rolled back with the ledger: the order is still PENDING and approvable.
    let order = OrderQueryApi::new(f.db.clone()).order_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.approved_by, None);
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);
}

#[tokio::test]
async fn clamp_policy_takes_short_counters_to_zero() {
    let f = fixture(2).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default())
        .with_stock_policy(StockShortfallPolicy::Clamp);
    let order_id = place(&api, f.user, f.variant, 4).await;

    let approved = api.approve_order(order_id, &f.admin).await.unwrap();
    assert_eq!(approved.order.order_status, OrderStatus::Approved);
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 0);
    assert_eq!(common::product_stock(f.db.pool(), f.product).await, 0);
}

#[tokio::test]
async fn concurrent_approvals_have_exactly_one_winner() {
    let f = fixture(10).await;
    let api = Arc::new(OrderFlowApi::new(f.db.clone(), EventProducers::default()));
    let order_id = place(&api, f.user, f.variant, 3).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let api = Arc::clone(&api);
        let admin = f.admin.clone();
        handles.push(tokio::spawn(async move { api.approve_order(order_id, &admin).await }));
    }
    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(approved) => {
                winners += 1;
                assert_eq!(approved.order.order_status, OrderStatus::Approved);
            },
            Err(e) => assert!(
                matches!(e, OrderFlowError::Database(FulfillmentError::InvalidTransition { .. })),
                "loser saw unexpected error: {e}"
            ),
        }
    }
    assert_eq!(winners, 1);
    // Stock was decremented exactly once despite four attempts.
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 7);
    assert_eq!(common::product_stock(f.db.pool(), f.product).await, 7);
}

#[tokio::test]
async fn generic_updates_are_unconstrained_by_default() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());
    let order_id = place(&api, f.user, f.variant, 1).await;

    // The full-mesh default mirrors the store's historical endpoint: any move goes, including
    // skipping straight to DELIVERED.
    let order = api.set_order_status(order_id, OrderStatus::Delivered, &f.admin).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Delivered);
    let order = api.set_order_status(order_id, OrderStatus::Cancelled, &f.admin).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn a_linear_pipeline_policy_rejects_skips() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default())
        .with_transition_policy(TransitionPolicy::linear_pipeline());
    let order_id = place(&api, f.user, f.variant, 1).await;

    let err = api.set_order_status(order_id, OrderStatus::Delivered, &f.admin).await.unwrap_err();
    assert!(matches!(
        err,
        OrderFlowError::Database(FulfillmentError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered
        })
    ));

    api.approve_order(order_id, &f.admin).await.unwrap();
    let order = api.set_order_status(order_id, OrderStatus::Shipped, &f.admin).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Shipped);
}

#[tokio::test]
async fn setting_status_to_approved_runs_the_ledger_exactly_once() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());
    let order_id = place(&api, f.user, f.variant, 3).await;

    // The generic path cannot bypass the ledger...
    let order = api.set_order_status(order_id, OrderStatus::Approved, &f.admin).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Approved);
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);

    // ...and cannot run it twice either.
    let err = api.set_order_status(order_id, OrderStatus::Approved, &f.admin).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::Database(FulfillmentError::InvalidTransition { .. })));
    assert_eq!(common::variant_stock(f.db.pool(), f.variant).await, 2);
}

#[tokio::test]
async fn every_lifecycle_step_notifies_the_customer_exactly_once() {
    let f = fixture(5).await;
    let api = OrderFlowApi::new(f.db.clone(), EventProducers::default());

    let order_id = place(&api, f.user, f.variant, 1).await;
    assert_eq!(common::notification_count(f.db.pool(), f.user).await, 1);

    api.approve_order(order_id, &f.admin).await.unwrap();
    assert_eq!(common::notification_count(f.db.pool(), f.user).await, 2);

    api.set_order_status(order_id, OrderStatus::Shipped, &f.admin).await.unwrap();
    assert_eq!(common::notification_count(f.db.pool(), f.user).await, 3);

    let inbox = NotificationApi::new(f.db.clone()).notifications_for_user(f.user).await.unwrap();
    assert_eq!(inbox[0].title, "Order Status Update");
    assert_eq!(inbox[0].message, format!("Your order #{order_id} status has been updated to SHIPPED."));

    // A failed transition notifies nobody.
    let _ = api.approve_order(order_id, &f.admin).await.unwrap_err();
    assert_eq!(common::notification_count(f.db.pool(), f.user).await, 3);
}
