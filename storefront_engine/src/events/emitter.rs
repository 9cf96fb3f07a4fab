//! Turns order lifecycle events into notification rows.
//!
//! The emitter is called by the order flow *after* the owning transaction has committed. Writing
//! the notification row is best-effort: if it fails, the error is logged and the order and stock
//! changes stand. The event is then forwarded to any subscriber hooks for external delivery.

use log::*;

use crate::{
    db_types::NewNotification,
    events::{EventProducers, OrderLifecycleEvent},
    traits::NotificationManagement,
};

/// Derives the notification record for a lifecycle event. Deterministic; the texts are the store's
/// customer-facing wording.
pub fn derive_notification(event: &OrderLifecycleEvent) -> NewNotification {
    match event {
        OrderLifecycleEvent::Created(ev) => NewNotification {
            user_id: ev.order.user_id,
            title: "Order Placed Successfully".to_string(),
            message: format!(
                "Your order #{} has been placed successfully. Status: {}.",
                ev.order.id, ev.order.order_status
            ),
        },
        OrderLifecycleEvent::StatusChanged(ev) => NewNotification {
            user_id: ev.order.user_id,
            title: "Order Status Update".to_string(),
            message: format!("Your order #{} status has been updated to {}.", ev.order.id, ev.order.order_status),
        },
    }
}

pub struct NotificationEmitter<B> {
    db: B,
    producers: EventProducers,
}

impl<B> NotificationEmitter<B>
where B: NotificationManagement
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    /// Records one notification for the event and forwards it to subscribers. Never fails; any
    /// problem is logged and swallowed so the owning flow is unaffected.
    pub async fn emit(&self, event: OrderLifecycleEvent) {
        let notification = derive_notification(&event);
        let user_id = notification.user_id;
        if let Err(e) = self.db.insert_notification(notification).await {
            warn!("📬️ Could not record a notification for user {user_id}: {e}");
        }
        match event {
            OrderLifecycleEvent::Created(ev) => {
                for producer in &self.producers.order_created {
                    producer.publish_event(ev.clone()).await;
                }
            },
            OrderLifecycleEvent::StatusChanged(ev) => {
                for producer in &self.producers.order_status_changed {
                    producer.publish_event(ev.clone()).await;
                }
            },
        }
    }
}
