//! Data types shared between the engine API and the database backends.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct StatusConversionError(String);

//--------------------------------------    OrderStatus     ----------------------------------------------------------
/// The fulfilment status of an order.
///
/// Orders are created `Pending`. The transition into `Approved` is the only one with side effects
/// (the stock ledger runs exactly once); `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Approved,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] =
        [OrderStatus::Pending, OrderStatus::Approved, OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Approved => write!(f, "APPROVED"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(StatusConversionError(other.to_string())),
        }
    }
}

//--------------------------------------   PaymentStatus    ----------------------------------------------------------
/// The payment status stamped on an order. Orders are created `Pending`; the engine itself never
/// transitions this field (payment confirmations are reconciled out-of-band, correlated only through
/// the provider session metadata).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Failed => write!(f, "FAILED"),
        }
    }
}

//--------------------------------------    DiscountType    ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountType {
    /// `value` is a percentage of the order subtotal.
    Percent,
    /// `value` is a fixed amount off the order subtotal.
    Fixed,
}

impl Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percent => write!(f, "PERCENT"),
            DiscountType::Fixed => write!(f, "FIXED"),
        }
    }
}

//--------------------------------------       Coupon       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    /// Interpreted according to `discount_type`: a percentage for `Percent`, an amount for `Fixed`.
    pub value: Money,
    /// The minimum order subtotal for the coupon to apply.
    pub min_amount: Money,
    pub expires_at: DateTime<Utc>,
    /// Carried from the store's coupon model, but not decremented on use.
    pub usage_limit: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Order        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub address_id: i64,
    /// The order subtotal, before any discount.
    pub total_amount: Money,
    pub discount: Money,
    /// `total_amount - discount`; the amount owed.
    pub grand_total: Money,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub approved_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder      ----------------------------------------------------------
/// A priced order ready to be persisted. Built by the order flow from a cart snapshot; both statuses
/// start out `Pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub address_id: i64,
    pub total_amount: Money,
    pub discount: Money,
    pub grand_total: Money,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     OrderItem      ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    /// The variant's price at the moment the order was built. Immutable thereafter, so later price
    /// changes on the variant never affect a placed order.
    pub price_at_purchase: Money,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub variant_id: i64,
    pub quantity: i64,
}

//--------------------------------------  Product / Variant -----------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

//--------------------------------------    Notification    ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
}

//--------------------------------------      Payment       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    /// The store user the provider session was created for, when the session metadata could be
    /// resolved to one. Guest checkouts leave this empty.
    pub user_id: Option<i64>,
    /// The provider's checkout-session id. Unique; the idempotency key against replayed events.
    pub session_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount_total: Money,
    /// The provider's own status vocabulary (e.g. "paid"), stored verbatim.
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentItem {
    pub id: i64,
    pub payment_id: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub session_id: String,
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: String,
    pub amount_total: Money,
    pub payment_status: String,
    pub items: Vec<NewPaymentItem>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

//--------------------------------------       Actor        ----------------------------------------------------------
/// The authenticated staff member performing an administrative action. Threaded explicitly into
/// every transition so that `approved_by` stamping and audit logging never rely on ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub username: String,
}

impl Actor {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self { id, username: username.into() }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.username, self.id)
    }
}
