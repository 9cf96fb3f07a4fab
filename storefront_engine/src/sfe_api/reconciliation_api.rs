use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;
use sf_common::{Money, Secret};

use crate::{
    db_types::{NewPayment, NewPaymentItem},
    helpers::{verify_webhook_signature, DEFAULT_TOLERANCE_SECONDS},
    sfe_api::{
        errors::ReconciliationError,
        payment_objects::{CheckoutSession, EventAck, ProviderEvent, CHECKOUT_SESSION_COMPLETED},
    },
    traits::{InsertPaymentResult, ReconciliationDatabase},
};

/// `ReconciliationApi` consumes payment-completion events from the payment provider and persists
/// them as payment records.
///
/// Events arrive as raw signed payloads. Nothing is parsed, let alone written, until the signature
/// verifies; after that the reconciler always acknowledges the event, because a verified event
/// the provider keeps retrying helps nobody: duplicates are detected and ignored, and persistence
/// faults are logged and deferred.
pub struct ReconciliationApi<B> {
    db: B,
    secret: Secret<String>,
    tolerance: Duration,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B>
where B: ReconciliationDatabase
{
    pub fn new(db: B, secret: Secret<String>) -> Self {
        Self { db, secret, tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECONDS) }
    }

    /// Overrides the signature timestamp tolerance.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Processes one provider event.
    ///
    /// Fails (with no writes) only on a bad signature or an unparseable payload. Everything after
    /// that resolves to an [`EventAck`] the transport should answer with a success response.
    pub async fn process_event(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> Result<EventAck, ReconciliationError> {
        verify_webhook_signature(payload, signature_header, &self.secret, now, self.tolerance).map_err(|e| {
            warn!("🔐️ Rejected a provider event: {e}");
            e
        })?;
        let event = serde_json::from_slice::<ProviderEvent>(payload)
            .map_err(|e| ReconciliationError::MalformedPayload(e.to_string()))?;
        if event.kind != CHECKOUT_SESSION_COMPLETED {
            debug!("💳️ Ignoring provider event of kind {}", event.kind);
            return Ok(EventAck::Ignored { kind: event.kind });
        }
        let session = event.data.object;
        let session_id = session.id.clone();
        let payment = self.payment_from_session(session).await;
        match self.db.insert_payment(payment).await {
            Ok(InsertPaymentResult::Inserted(payment)) => {
                info!(
                    "💳️ Payment stored for session [{session_id}]: {} from {} ({})",
                    payment.amount_total, payment.customer_name, payment.payment_status
                );
                Ok(EventAck::Recorded { payment_id: payment.id })
            },
            Ok(InsertPaymentResult::AlreadyRecorded(_)) => {
                info!("💳️ Session [{session_id}] is already recorded; replay acknowledged");
                Ok(EventAck::AlreadyRecorded)
            },
            Err(e) => {
                error!("💳️ Could not persist payment for session [{session_id}]: {e}. Acknowledging anyway.");
                Ok(EventAck::Deferred)
            },
        }
    }

    async fn payment_from_session(&self, session: CheckoutSession) -> NewPayment {
        let user_id = match session.metadata.user_id.as_deref() {
            Some(raw) => self.resolve_user(raw).await,
            None => None,
        };
        let (customer_name, customer_email) = match session.customer_details {
            Some(details) => (
                details.name.unwrap_or_else(|| "Guest".to_string()),
                details.email.unwrap_or_else(|| "No Email".to_string()),
            ),
            None => ("Guest".to_string(), "No Email".to_string()),
        };
        let mut items = Vec::with_capacity(session.line_items.len());
        for line_item in session.line_items {
            let metadata = line_item.product.metadata;
            match (metadata.product_id, metadata.product_name) {
                (Some(product_id), Some(product_name)) => {
                    items.push(NewPaymentItem { product_id, product_name, quantity: line_item.quantity });
                },
                _ => {
                    // A line item the provider could not attribute to a store product. Keep the
                    // payment; drop the item.
                    warn!(
                        "💳️ Session [{}] has a line item without product metadata; item skipped",
                        session.id
                    );
                },
            }
        }
        NewPayment {
            session_id: session.id,
            user_id,
            customer_name,
            customer_email,
            amount_total: Money::from_minor_units(session.amount_total),
            payment_status: session.payment_status,
            items,
        }
    }

    /// Resolves the session's `user_id` metadata to a store user. Lenient by contract: junk
    /// metadata or a lookup failure yields `None`, never an error.
    async fn resolve_user(&self, raw: &str) -> Option<i64> {
        let user_id = match raw.parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                debug!("💳️ Session metadata user_id {raw:?} is not a user id; treating as guest");
                return None;
            },
        };
        match self.db.resolve_user(user_id).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("💳️ Could not resolve user {user_id}: {e}. Treating as guest.");
                None
            },
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
