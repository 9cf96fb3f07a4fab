//! # Storefront engine public API
//!
//! The `sfe_api` module exposes the programmatic API of the fulfilment engine. The API is modular:
//! clients pick the surfaces they need, and different surfaces can even be served by different
//! backends.
//!
//! * [`order_flow_api`] is the primary API: it builds priced orders from cart snapshots and drives
//!   the order state machine (approval with its stock ledger, generic status updates).
//! * [`reconciliation_api`] consumes signed payment-provider events and persists payment records.
//! * [`notifications_api`] exposes the notification inbox (fetch, mark read, direct send).
//! * [`orders_api`] provides read-only order queries.
//!
//! The usage pattern is the same for every surface: construct it over a backend that implements
//! the required traits.
//!
//! ```rust,ignore
//! use storefront_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/store.db", 5).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let placed = api.place_order(request, Utc::now()).await?;
//! ```

pub mod errors;
pub mod notifications_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod orders_api;
pub mod payment_objects;
pub mod reconciliation_api;
