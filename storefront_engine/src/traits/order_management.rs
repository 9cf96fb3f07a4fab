use crate::{
    db_types::{Order, OrderItem},
    sfe_api::order_objects::OrderQueryFilter,
    traits::FulfillmentError,
};

/// Read-side queries over orders. Kept separate from [`crate::traits::FulfillmentDatabase`] so
/// that reporting surfaces can be handed a backend without any write capability.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, FulfillmentError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, FulfillmentError>;

    /// Fetches orders matching the filter, ordered by creation time ascending.
    async fn search_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, FulfillmentError>;

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, FulfillmentError>;
}
