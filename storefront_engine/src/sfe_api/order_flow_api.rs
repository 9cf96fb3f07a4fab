use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sf_common::Money;

use crate::{
    db_types::{Actor, Coupon, NewOrder, NewOrderItem, Order, OrderStatus},
    events::{
        EventProducers,
        NotificationEmitter,
        OrderCreatedEvent,
        OrderLifecycleEvent,
        OrderStatusChangedEvent,
    },
    helpers::evaluate_coupon,
    policies::{StockShortfallPolicy, TransitionPolicy},
    sfe_api::{
        errors::OrderFlowError,
        order_objects::{ApprovedOrder, NewOrderRequest, PlacedOrder},
    },
    traits::{FulfillmentDatabase, FulfillmentError, NotificationManagement},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: building a priced order from a cart
/// snapshot, and driving the state machine that governs approval (with its one-shot stock ledger)
/// and the generic status updates.
pub struct OrderFlowApi<B> {
    db: B,
    emitter: NotificationEmitter<B>,
    stock_policy: StockShortfallPolicy,
    transition_policy: TransitionPolicy,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B>
where B: FulfillmentDatabase + NotificationManagement
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        let emitter = NotificationEmitter::new(db.clone(), producers);
        Self { db, emitter, stock_policy: StockShortfallPolicy::default(), transition_policy: TransitionPolicy::default() }
    }

    /// Overrides the default (skip) behaviour when stock cannot cover an approved quantity.
    pub fn with_stock_policy(mut self, policy: StockShortfallPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    /// Overrides the default (full-mesh) adjacency table for generic status updates.
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// Builds and persists a priced order from a cart snapshot.
    ///
    /// The subtotal is computed from the cart's recorded prices; each order item's purchase price
    /// is snapshotted from the variant's current price inside the insert transaction. A coupon
    /// code, when present, must resolve and evaluate cleanly or the whole placement fails with no
    /// side effects. The cart itself is never modified.
    ///
    /// Emits one `OrderCreated` notification after the order is committed.
    pub async fn place_order(&self, request: NewOrderRequest, now: DateTime<Utc>) -> Result<PlacedOrder, OrderFlowError> {
        if request.cart.is_empty() {
            return Err(OrderFlowError::EmptyCart);
        }
        if let Some(line) = request.cart.lines.iter().find(|line| line.quantity == 0) {
            return Err(OrderFlowError::ZeroQuantity(line.variant_id));
        }
        let subtotal = request.cart.subtotal();
        let discount = match &request.coupon_code {
            Some(code) => {
                let coupon = self
                    .db
                    .fetch_coupon_by_code(code)
                    .await?
                    .ok_or_else(|| FulfillmentError::CouponNotFound(code.clone()))?;
                evaluate_coupon(&coupon, subtotal, now)?
            },
            None => Money::zero(),
        };
        let grand_total = subtotal - discount;
        let order = NewOrder {
            user_id: request.user_id,
            address_id: request.address_id,
            total_amount: subtotal,
            discount,
            grand_total,
            created_at: now,
        };
        let items = request
            .cart
            .lines
            .iter()
            .map(|line| NewOrderItem { variant_id: line.variant_id, quantity: i64::from(line.quantity) })
            .collect::<Vec<_>>();
        let (order, items) = self.db.insert_order(order, &items).await?;
        info!(
            "🛒️ Order #{} placed for user {}: subtotal {subtotal}, discount {discount}, grand total {grand_total}",
            order.id, order.user_id
        );
        self.emitter.emit(OrderLifecycleEvent::Created(OrderCreatedEvent::new(order.clone()))).await;
        Ok(PlacedOrder { order, items })
    }

    /// Approves a pending order.
    ///
    /// Only a `PENDING` order may be approved; anything else fails with
    /// [`FulfillmentError::InvalidTransition`]. On success the order is `APPROVED`, stamped with
    /// the approving actor, and stock for its items has been decremented exactly once, all in one
    /// transaction. Concurrent approval attempts on the same order serialise: one wins, the rest
    /// observe the transition error.
    ///
    /// Emits one `OrderStatusChanged` notification after the transaction commits.
    pub async fn approve_order(&self, order_id: i64, actor: &Actor) -> Result<ApprovedOrder, OrderFlowError> {
        let (order, ledger) = self.db.approve_order(order_id, actor, self.stock_policy).await?;
        info!("🛒️ Order #{order_id} approved by {actor}");
        self.emitter
            .emit(OrderLifecycleEvent::StatusChanged(OrderStatusChangedEvent::new(OrderStatus::Pending, order.clone())))
            .await;
        Ok(ApprovedOrder { order, ledger })
    }

    /// Moves an order to `new_status`, subject to the configured transition policy.
    ///
    /// A transition into `APPROVED` is routed through [`Self::approve_order`], so the stock ledger
    /// cannot be bypassed (or run twice) via the generic update path.
    ///
    /// Emits one `OrderStatusChanged` notification per successful transition.
    pub async fn set_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        actor: &Actor,
    ) -> Result<Order, OrderFlowError> {
        if new_status == OrderStatus::Approved {
            return self.approve_order(order_id, actor).await.map(|approved| approved.order);
        }
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or(FulfillmentError::OrderNotFound(order_id))?;
        let from = order.order_status;
        if !self.transition_policy.allows(from, new_status) {
            return Err(FulfillmentError::InvalidTransition { from, to: new_status }.into());
        }
        let order = self.db.set_order_status(order_id, from, new_status).await?;
        info!("🛒️ Order #{order_id} status changed {from} → {new_status} by {actor}");
        self.emitter
            .emit(OrderLifecycleEvent::StatusChanged(OrderStatusChangedEvent::new(from, order.clone())))
            .await;
        Ok(order)
    }

    /// Pre-checkout coupon validation: resolves the code and checks usage limit, expiry and,
    /// when a subtotal is supplied, the coupon minimum. Returns the coupon so callers can show
    /// its terms. Makes no writes.
    pub async fn validate_coupon(
        &self,
        code: &str,
        subtotal: Option<Money>,
        now: DateTime<Utc>,
    ) -> Result<Coupon, OrderFlowError> {
        let coupon =
            self.db.fetch_coupon_by_code(code).await?.ok_or_else(|| FulfillmentError::CouponNotFound(code.to_string()))?;
        if coupon.usage_limit <= 0 {
            return Err(OrderFlowError::CouponUsageLimitReached(coupon.code));
        }
        match subtotal {
            Some(subtotal) => {
                evaluate_coupon(&coupon, subtotal, now)?;
            },
            None => {
                if coupon.expires_at < now {
                    return Err(crate::helpers::CouponError::Expired {
                        code: coupon.code.clone(),
                        expired_at: coupon.expires_at,
                    }
                    .into());
                }
            },
        }
        Ok(coupon)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
