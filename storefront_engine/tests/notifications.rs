//! The notification inbox and the delivery hook wiring.

mod common;

use std::time::Duration;

use chrono::Utc;
use storefront_engine::{
    db_types::{Actor, NewNotification, OrderStatus},
    events::{EventHandlers, EventHooks, EventProducers},
    order_objects::{CartLine, CartSnapshot, NewOrderRequest},
    NotificationApi,
    NotificationApiError,
    OrderFlowApi,
};

#[tokio::test]
async fn direct_send_requires_a_title_and_message() {
    let db = common::prepare_test_db().await;
    let user = common::seed_user(db.pool(), "alice").await;
    let admin = Actor::new(common::seed_user(db.pool(), "admin").await, "admin");
    let api = NotificationApi::new(db.clone());

    let err = api
        .send_direct(&admin, NewNotification { user_id: user, title: "  ".to_string(), message: "hi".to_string() })
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationApiError::MissingFields));

    let sent = api
        .send_direct(
            &admin,
            NewNotification {
                user_id: user,
                title: "Sale starts Friday".to_string(),
                message: "Up to 40% off selected shoes.".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(sent.user_id, user);
    assert!(!sent.is_read);
}

#[tokio::test]
async fn marking_read_flips_the_flag_and_is_idempotent() {
    let db = common::prepare_test_db().await;
    let user = common::seed_user(db.pool(), "alice").await;
    let admin = Actor::new(common::seed_user(db.pool(), "admin").await, "admin");
    let api = NotificationApi::new(db.clone());
    let sent = api
        .send_direct(&admin, NewNotification { user_id: user, title: "Hello".to_string(), message: "World".to_string() })
        .await
        .unwrap();

    let read = api.mark_as_read(sent.id).await.unwrap();
    assert!(read.is_read);
    let read_again = api.mark_as_read(sent.id).await.unwrap();
    assert!(read_again.is_read);

    let err = api.mark_as_read(999_999).await.unwrap_err();
    assert!(matches!(err, NotificationApiError::Database(_)));
}

#[tokio::test]
async fn inboxes_are_scoped_and_newest_first() {
    let db = common::prepare_test_db().await;
    let alice = common::seed_user(db.pool(), "alice").await;
    let bob = common::seed_user(db.pool(), "bob").await;
    let admin = Actor::new(common::seed_user(db.pool(), "admin").await, "admin");
    let api = NotificationApi::new(db.clone());

    for (user, title) in [(alice, "first"), (alice, "second"), (bob, "other")] {
        api.send_direct(
            &admin,
            NewNotification { user_id: user, title: title.to_string(), message: "m".to_string() },
        )
        .await
        .unwrap();
    }

    let inbox = api.notifications_for_user(alice).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].title, "second");
    assert_eq!(inbox[1].title, "first");

    let all = api.all_notifications().await.unwrap();
    assert_eq!(all.len(), 3);
}

/// An application subscribes to status-change events for external delivery; approving an order
/// must hand the event to the hook without coupling it to the approval transaction.
#[tokio::test]
async fn status_change_events_reach_subscriber_hooks() {
    let db = common::prepare_test_db().await;
    let user = common::seed_user(db.pool(), "alice").await;
    let admin = Actor::new(common::seed_user(db.pool(), "admin").await, "admin");
    let product = common::seed_product(db.pool(), "Trail Shoe", 10).await;
    let variant = common::seed_variant(db.pool(), product, "SHOE-41", "100.00", 10).await;

    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    let mut hooks = EventHooks::default();
    hooks.on_order_status_changed(move |ev| {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(ev).await;
        })
    });
    let handlers = EventHandlers::new(8, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let api = OrderFlowApi::new(db.clone(), producers);
    let cart = CartSnapshot::new(vec![CartLine { variant_id: variant, unit_price: "100.00".parse().unwrap(), quantity: 1 }]);
    let placed = api
        .place_order(NewOrderRequest { user_id: user, address_id: 1, cart, coupon_code: None }, Utc::now())
        .await
        .unwrap();
    api.approve_order(placed.order.id, &admin).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for the status-change event")
        .expect("event channel closed");
    assert_eq!(event.order.id, placed.order.id);
    assert_eq!(event.old_status, OrderStatus::Pending);
    assert_eq!(event.order.order_status, OrderStatus::Approved);
}

/// The default producer set has no subscribers; emission must still record the inbox row and the
/// flow must be unaffected.
#[tokio::test]
async fn emission_without_subscribers_is_harmless() {
    let db = common::prepare_test_db().await;
    let user = common::seed_user(db.pool(), "alice").await;
    let product = common::seed_product(db.pool(), "Trail Shoe", 10).await;
    let variant = common::seed_variant(db.pool(), product, "SHOE-41", "100.00", 10).await;
    let api = OrderFlowApi::new(db.clone(), EventProducers::default());

    let cart = CartSnapshot::new(vec![CartLine { variant_id: variant, unit_price: "100.00".parse().unwrap(), quantity: 2 }]);
    api.place_order(NewOrderRequest { user_id: user, address_id: 1, cart, coupon_code: None }, Utc::now())
        .await
        .unwrap();
    assert_eq!(common::notification_count(db.pool(), user).await, 1);
}
