//! Behaviour contracts for engine database backends.
//!
//! The engine never talks to storage directly; each API surface is generic over one of the traits
//! in this module, and a backend (currently SQLite) implements all of them.
//!
//! * [`FulfillmentDatabase`] is the write side of the order flow: atomic order creation, the
//!   approval transition with its stock ledger, and generic status updates.
//! * [`OrderManagement`] is the read side: fetching and searching orders and their items.
//! * [`NotificationManagement`] records and queries notification rows.
//! * [`ReconciliationDatabase`] persists provider payment events idempotently and resolves the
//!   narrow identity surface (does this user id exist?).

mod data_objects;
mod fulfillment_database;
mod notification_management;
mod order_management;
mod reconciliation;

pub use data_objects::{InsertPaymentResult, StockLedgerEntry, StockLedgerReport};
pub use fulfillment_database::{FulfillmentDatabase, FulfillmentError};
pub use notification_management::{NotificationError, NotificationManagement};
pub use order_management::OrderManagement;
pub use reconciliation::{ReconciliationDatabase, ReconciliationDbError};
