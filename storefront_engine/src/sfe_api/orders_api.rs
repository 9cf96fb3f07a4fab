use std::fmt::Debug;

use crate::{
    db_types::{Order, OrderItem},
    sfe_api::order_objects::OrderQueryFilter,
    traits::{FulfillmentError, OrderManagement},
};

/// Read-only order queries: order history pages, detail views, admin searches.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, FulfillmentError> {
        self.db.fetch_order_by_id(order_id).await
    }

    pub async fn items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, FulfillmentError> {
        self.db.fetch_order_items(order_id).await
    }

    pub async fn search(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, FulfillmentError> {
        self.db.search_orders(filter).await
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, FulfillmentError> {
        self.db.fetch_orders_for_user(user_id).await
    }
}
