use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentItem},
    traits::{InsertPaymentResult, ReconciliationDbError},
};

/// Inserts a payment and its items using the given connection. Callers wrap this in a transaction.
///
/// The UNIQUE constraint on `session_id` is the idempotency guard: a replayed event, including one
/// racing this insert from another connection, trips the constraint and comes back as
/// `AlreadyRecorded` with nothing written.
pub async fn idempotent_insert(
    payment: NewPayment,
    conn: &mut SqliteConnection,
) -> Result<InsertPaymentResult, ReconciliationDbError> {
    let session_id = payment.session_id.clone();
    let inserted: Result<Payment, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO payments (user_id, session_id, customer_name, customer_email, amount_total, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(payment.user_id)
    .bind(&payment.session_id)
    .bind(&payment.customer_name)
    .bind(&payment.customer_email)
    .bind(payment.amount_total)
    .bind(&payment.payment_status)
    .fetch_one(&mut *conn)
    .await;
    let stored = match inserted {
        Ok(payment) => payment,
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            debug!("🏦️ Session [{session_id}] already has a payment record; nothing written");
            return Ok(InsertPaymentResult::AlreadyRecorded(session_id));
        },
        Err(e) => return Err(e.into()),
    };
    for item in &payment.items {
        sqlx::query(
            r#"
                INSERT INTO payment_items (payment_id, product_id, product_name, quantity)
                VALUES ($1, $2, $3, $4);
            "#,
        )
        .bind(stored.id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🏦️ Payment #{} stored for session [{session_id}] with {} items", stored.id, payment.items.len());
    Ok(InsertPaymentResult::Inserted(stored))
}

pub async fn fetch_payment_by_session_id(
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<(Payment, Vec<PaymentItem>)>, ReconciliationDbError> {
    let payment: Option<Payment> =
        sqlx::query_as("SELECT * FROM payments WHERE session_id = $1").bind(session_id).fetch_optional(&mut *conn).await?;
    let payment = match payment {
        Some(payment) => payment,
        None => return Ok(None),
    };
    let items = sqlx::query_as("SELECT * FROM payment_items WHERE payment_id = $1 ORDER BY id ASC")
        .bind(payment.id)
        .fetch_all(conn)
        .await?;
    Ok(Some((payment, items)))
}
