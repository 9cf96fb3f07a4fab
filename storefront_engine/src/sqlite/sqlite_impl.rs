//! `SqliteDatabase` is the concrete SQLite backend for the fulfilment engine. It implements all
//! the traits defined in the [`crate::traits`] module.

use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{coupons, inventory, new_pool, notifications, orders, payments, users};
use crate::{
    db_types::{
        Actor,
        Coupon,
        NewNotification,
        NewOrder,
        NewOrderItem,
        NewPayment,
        Notification,
        Order,
        OrderItem,
        OrderStatus,
        Payment,
        PaymentItem,
    },
    policies::StockShortfallPolicy,
    sfe_api::order_objects::OrderQueryFilter,
    traits::{
        FulfillmentDatabase,
        FulfillmentError,
        InsertPaymentResult,
        NotificationError,
        NotificationManagement,
        OrderManagement,
        ReconciliationDatabase,
        ReconciliationDbError,
        StockLedgerReport,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let coupon = coupons::fetch_coupon_by_code(code, &mut conn).await?;
        Ok(coupon)
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let (order, items) = orders::insert_order(order, items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} and its {} items have been saved", order.id, items.len());
        Ok((order, items))
    }

    async fn approve_order(
        &self,
        order_id: i64,
        actor: &Actor,
        policy: StockShortfallPolicy,
    ) -> Result<(Order, StockLedgerReport), FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        // The compare-and-set runs first so the transaction takes the write lock immediately and
        // concurrent approvals of the same order serialise on it.
        let order = match orders::mark_approved(order_id, actor.id, &mut tx).await? {
            Some(order) => order,
            None => {
                let existing = orders::fetch_order_by_id(order_id, &mut tx).await?;
                return Err(match existing {
                    None => FulfillmentError::OrderNotFound(order_id),
                    Some(order) => FulfillmentError::InvalidTransition {
                        from: order.order_status,
                        to: OrderStatus::Approved,
                    },
                });
            },
        };
        let items = orders::fetch_order_items(order_id, &mut tx).await?;
        let report = inventory::apply_stock_decrements(&items, policy, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Order #{order_id} approved by {actor}; stock ledger applied for {} items",
            report.entries.len()
        );
        Ok((order, report))
    }

    async fn set_order_status(
        &self,
        order_id: i64,
        expected_from: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<Order, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        match orders::update_order_status(order_id, expected_from, new_status, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order #{order_id} moved from {expected_from} to {new_status}");
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_id(order_id, &mut conn).await?;
                Err(match existing {
                    None => FulfillmentError::OrderNotFound(order_id),
                    // The order moved under us; report the transition that actually failed.
                    Some(order) => {
                        FulfillmentError::InvalidTransition { from: order.order_status, to: new_status }
                    },
                })
            },
        }
    }

    async fn close(&mut self) -> Result<(), FulfillmentError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(filter, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError> {
        let mut conn = self.pool.acquire().await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;
        notifications::insert_notification(notification, &mut conn).await
    }

    async fn fetch_notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;
        notifications::fetch_notifications_for_user(user_id, &mut conn).await
    }

    async fn fetch_all_notifications(&self) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;
        notifications::fetch_all_notifications(&mut conn).await
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<Notification, NotificationError> {
        let mut conn = self.pool.acquire().await.map_err(|e| NotificationError::DatabaseError(e.to_string()))?;
        notifications::mark_notification_read(notification_id, &mut conn).await
    }
}

impl ReconciliationDatabase for SqliteDatabase {
    async fn insert_payment(&self, payment: NewPayment) -> Result<InsertPaymentResult, ReconciliationDbError> {
        let mut tx = self.pool.begin().await.map_err(ReconciliationDbError::from)?;
        let result = payments::idempotent_insert(payment, &mut tx).await?;
        tx.commit().await.map_err(ReconciliationDbError::from)?;
        if let InsertPaymentResult::Inserted(payment) = &result {
            debug!("🗃️ Payment #{} recorded for session [{}]", payment.id, payment.session_id);
        }
        Ok(result)
    }

    async fn fetch_payment_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<(Payment, Vec<PaymentItem>)>, ReconciliationDbError> {
        let mut conn = self.pool.acquire().await.map_err(ReconciliationDbError::from)?;
        payments::fetch_payment_by_session_id(session_id, &mut conn).await
    }

    async fn resolve_user(&self, user_id: i64) -> Result<Option<i64>, ReconciliationDbError> {
        let mut conn = self.pool.acquire().await.map_err(ReconciliationDbError::from)?;
        let resolved = users::user_exists(user_id, &mut conn).await.map_err(ReconciliationDbError::from)?;
        Ok(resolved)
    }
}
