mod coupons;
mod webhook_signature;

pub use coupons::{evaluate_coupon, CouponError};
pub use webhook_signature::{
    sign_payload,
    verify_webhook_signature,
    WebhookSignature,
    WebhookSignatureError,
    DEFAULT_TOLERANCE_SECONDS,
};
