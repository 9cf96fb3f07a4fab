//! Storefront Fulfillment Engine
//!
//! The fulfilment engine is the part of the Storefront backend with real invariants: money must
//! balance, stock must never go negative and is decremented exactly once per approval, and
//! customer notifications must reflect true order state. This library contains that core logic.
//! It is transport-agnostic: HTTP routing, authentication and the payment provider's checkout UI
//! all live elsewhere and talk to the engine through the APIs in [`mod@sfe_api`].
//!
//! The library is divided into three main sections:
//! 1. Database contracts and backends ([`mod@traits`], [`mod@sqlite`]). SQLite is the supported
//!    backend. You should never need to touch the database directly; use the public API instead.
//!    The exception is the data types stored in the database, which are public in [`mod@db_types`].
//! 2. The engine public API ([`mod@sfe_api`]): order flow (cart → priced order → approval with
//!    its one-shot stock ledger → delivery), payment-event reconciliation, notifications and
//!    order queries.
//! 3. Order lifecycle events ([`mod@events`]). Every order creation and status transition emits
//!    an event; a simple hook system lets applications subscribe (e.g. to deliver notifications
//!    over email or push) without coupling delivery to the engine's transactions.

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod policies;
pub mod sfe_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};
pub use sfe_api::{
    errors::{NotificationApiError, OrderFlowError, ReconciliationError},
    notifications_api::NotificationApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    orders_api::OrderQueryApi,
    payment_objects,
    reconciliation_api::ReconciliationApi,
};
