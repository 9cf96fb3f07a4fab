use serde::{Deserialize, Serialize};

use crate::db_types::Payment;

//--------------------------------------  StockLedgerReport  ---------------------------------------------------------
/// What the inventory ledger did for a single order item during an approval.
///
/// Under the default shortfall policy a counter that cannot cover the quantity is left unchanged,
/// so callers (and tests) can see exactly which counters were touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    pub variant_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub variant_decremented: bool,
    pub product_decremented: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockLedgerReport {
    pub entries: Vec<StockLedgerEntry>,
}

impl StockLedgerReport {
    /// True when every counter covered its quantity in full.
    pub fn fully_applied(&self) -> bool {
        self.entries.iter().all(|e| e.variant_decremented && e.product_decremented)
    }
}

//--------------------------------------  InsertPaymentResult  -------------------------------------------------------
/// The outcome of persisting a provider payment event.
#[derive(Debug, Clone)]
pub enum InsertPaymentResult {
    /// The payment and its items were written.
    Inserted(Payment),
    /// A payment with this session id already exists; nothing was written.
    AlreadyRecorded(String),
}
