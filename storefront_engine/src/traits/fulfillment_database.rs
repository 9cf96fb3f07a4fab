use thiserror::Error;

use crate::{
    db_types::{Actor, Coupon, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus},
    policies::StockShortfallPolicy,
    traits::{OrderManagement, StockLedgerReport},
};

/// The write side of the order flow. Implementations must provide atomic multi-row commits: an
/// order and its items exist together or not at all, and an approval's status flip and stock
/// decrements commit or roll back as one unit.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase: Clone + OrderManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Fetches the coupon with the given code, if any.
    async fn fetch_coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, FulfillmentError>;

    /// Persists an order and its items in a single transaction.
    ///
    /// Each item's `price_at_purchase` is resolved from the variant's *current* price inside the
    /// same transaction, so a concurrent price change can never split an order between old and new
    /// prices. A missing variant fails the entire insert.
    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), FulfillmentError>;

    /// Transitions an order from `PENDING` to `APPROVED` and applies the stock ledger for its
    /// items, all in one transaction.
    ///
    /// The status flip is a compare-and-set on `PENDING`, so of any number of concurrent approval
    /// attempts on the same order exactly one succeeds; the rest fail with
    /// [`FulfillmentError::InvalidTransition`] and leave the stock untouched. If the ledger fails
    /// (shortfall under [`StockShortfallPolicy::Reject`], or a storage fault), the transaction
    /// rolls back and the order remains `PENDING`.
    async fn approve_order(
        &self,
        order_id: i64,
        actor: &Actor,
        policy: StockShortfallPolicy,
    ) -> Result<(Order, StockLedgerReport), FulfillmentError>;

    /// Moves an order from `expected_from` to `new_status` with a compare-and-set on the previous
    /// status. Legality of the transition is the caller's concern (see
    /// [`crate::policies::TransitionPolicy`]); this method only guarantees that a concurrent
    /// transition cannot be silently overwritten.
    async fn set_order_status(
        &self,
        order_id: i64,
        expected_from: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<Order, FulfillmentError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), FulfillmentError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Product variant {0} does not exist")]
    VariantNotFound(i64),
    #[error("No coupon exists with code {0}")]
    CouponNotFound(String),
    #[error("Order may not move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Variant {variant_id} has {available} units in stock, but {requested} were requested")]
    InsufficientStock { variant_id: i64, requested: i64, available: i64 },
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}
