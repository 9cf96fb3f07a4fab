use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_common::Money;

use crate::{
    db_types::{Order, OrderItem, OrderStatus},
    traits::StockLedgerReport,
};

//--------------------------------------    CartSnapshot    ----------------------------------------------------------
/// A read-only snapshot of a shopping cart, as handed to the engine by the cart subsystem.
///
/// The engine never mutates cart state; in particular, placing an order does not clear the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub variant_id: i64,
    /// The unit price the cart recorded when the line was added. Used for the order subtotal;
    /// the per-item purchase price is re-read from the variant at checkout.
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartSnapshot {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `Σ unit_price × quantity` over all lines, in exact decimal arithmetic.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|line| line.unit_price * i64::from(line.quantity)).sum()
    }
}

//--------------------------------------   NewOrderRequest   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub user_id: i64,
    pub address_id: i64,
    pub cart: CartSnapshot,
    pub coupon_code: Option<String>,
}

//--------------------------------------     PlacedOrder     ---------------------------------------------------------
/// The result of a successful order placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

//--------------------------------------    ApprovedOrder    ---------------------------------------------------------
/// The result of a successful approval: the updated order and what the stock ledger did.
#[derive(Debug, Clone)]
pub struct ApprovedOrder {
    pub order: Order,
    pub ledger: StockLedgerReport,
}

//--------------------------------------   OrderQueryFilter   --------------------------------------------------------
/// Search criteria for order queries. An empty filter matches every order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub user_id: Option<i64>,
    pub status: Option<Vec<OrderStatus>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.status.is_none() && self.since.is_none() && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(user_id) = self.user_id {
            write!(f, "user: {user_id}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            write!(f, "status in [{statuses}]. ")?;
        }
        if let Some(since) = self.since {
            write!(f, "since: {since}. ")?;
        }
        if let Some(until) = self.until {
            write!(f, "until: {until}. ")?;
        }
        Ok(())
    }
}
