use thiserror::Error;

use crate::{
    helpers::{CouponError, WebhookSignatureError},
    traits::{FulfillmentError, NotificationError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("The shopping cart is empty")]
    EmptyCart,
    #[error("Cart line for variant {0} has a zero quantity")]
    ZeroQuantity(i64),
    #[error("Coupon {0} has no uses remaining")]
    CouponUsageLimitReached(String),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error(transparent)]
    Database(#[from] FulfillmentError),
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Event signature verification failed: {0}")]
    InvalidSignature(#[from] WebhookSignatureError),
    #[error("Event payload could not be parsed: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Clone, Error)]
pub enum NotificationApiError {
    #[error("user, title and message are all required")]
    MissingFields,
    #[error(transparent)]
    Database(#[from] NotificationError),
}
