//! Wire objects for payment-provider events.
//!
//! The provider delivers a JSON event whose body is signed (see
//! [`crate::helpers::verify_webhook_signature`]). Only `checkout.session.completed` events carry
//! data the engine cares about; the session inside one is expected to have been fetched with
//! expanded product metadata, so each line item names the store product it was sold against.

use serde::{Deserialize, Serialize};

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ProviderEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEventData {
    pub object: CheckoutSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// The provider's session id; the idempotency key for the whole event.
    pub id: String,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    pub payment_status: String,
    /// The total in integer minor units (e.g. paise); divided by 100 exactly on ingestion.
    pub amount_total: i64,
    #[serde(default)]
    pub metadata: SessionMetadata,
    #[serde(default)]
    pub line_items: Vec<SessionLineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// The store user the checkout session was created for, if any. An opaque string on the wire;
    /// resolved leniently, so junk here can never fail an event.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub quantity: i64,
    pub product: ProviderProduct,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderProduct {
    #[serde(default)]
    pub metadata: ProviderProductMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderProductMetadata {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

//--------------------------------------       EventAck       --------------------------------------------------------
/// How a verified event was disposed of. Whatever the variant, the caller should acknowledge the
/// event to the provider; only signature or parse failures warrant a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAck {
    /// A new payment record was written.
    Recorded { payment_id: i64 },
    /// The session id had already been recorded; the replay changed nothing.
    AlreadyRecorded,
    /// The event kind is not one the engine processes.
    Ignored { kind: String },
    /// Persistence failed after verification; the failure was logged and nothing was written.
    Deferred,
}
