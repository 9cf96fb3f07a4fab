use thiserror::Error;

use crate::{
    db_types::{NewPayment, Payment, PaymentItem},
    traits::InsertPaymentResult,
};

/// Persistence for reconciled provider payment events.
#[allow(async_fn_in_trait)]
pub trait ReconciliationDatabase: Clone {
    /// Persists a payment and its items in one transaction.
    ///
    /// The provider session id is the idempotency key: if a payment with the same session id
    /// already exists (including one racing this call), nothing is written and
    /// [`InsertPaymentResult::AlreadyRecorded`] is returned. This must hold under concurrent
    /// replays of the same event.
    async fn insert_payment(&self, payment: NewPayment) -> Result<InsertPaymentResult, ReconciliationDbError>;

    async fn fetch_payment_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<(Payment, Vec<PaymentItem>)>, ReconciliationDbError>;

    /// The narrow identity surface: does a user with this id exist? Used to resolve the provider
    /// session's `user_id` metadata to a store user.
    async fn resolve_user(&self, user_id: i64) -> Result<Option<i64>, ReconciliationDbError>;
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationDbError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ReconciliationDbError {
    fn from(e: sqlx::Error) -> Self {
        ReconciliationDbError::DatabaseError(e.to_string())
    }
}
