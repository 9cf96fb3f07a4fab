//! The inventory ledger: conditional stock decrements for approved orders.
//!
//! Variant and product counters are decremented with single conditional UPDATE statements, so the
//! read-check-write happens inside the database and two approvals racing over the same counter
//! cannot lose an update. All decrements for one order run on the caller's transaction; the
//! approval either commits with its decrements or rolls back with none of them.

use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{OrderItem, Product, ProductVariant},
    policies::StockShortfallPolicy,
    traits::{FulfillmentError, StockLedgerEntry, StockLedgerReport},
};

pub async fn fetch_variant(variant_id: i64, conn: &mut SqliteConnection) -> Result<Option<ProductVariant>, sqlx::Error> {
    let variant =
        sqlx::query_as("SELECT * FROM product_variants WHERE id = $1").bind(variant_id).fetch_optional(conn).await?;
    Ok(variant)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Applies the stock ledger for every item of an order being approved.
///
/// Per item, the variant counter and its product's aggregate counter are each decremented by the
/// ordered quantity iff they can cover it. What happens to a counter that cannot cover the
/// quantity depends on the policy: `Skip` leaves it unchanged, `Clamp` takes it to zero, and
/// `Reject` fails the approval (the caller's transaction rolls everything back).
pub(crate) async fn apply_stock_decrements(
    items: &[OrderItem],
    policy: StockShortfallPolicy,
    conn: &mut SqliteConnection,
) -> Result<StockLedgerReport, FulfillmentError> {
    let mut report = StockLedgerReport::default();
    for item in items {
        let variant = fetch_variant(item.variant_id, &mut *conn)
            .await?
            .ok_or(FulfillmentError::VariantNotFound(item.variant_id))?;
        let product = fetch_product(variant.product_id, &mut *conn).await?.ok_or_else(|| {
            FulfillmentError::DatabaseError(format!(
                "variant {} references missing product {}",
                variant.id, variant.product_id
            ))
        })?;
        let variant_decremented = decrement_variant_stock(variant.id, item.quantity, policy, &mut *conn).await?;
        let product_decremented = decrement_product_stock(product.id, item.quantity, policy, &mut *conn).await?;
        if !variant_decremented {
            debug!(
                "📉️ Variant {} stock ({}) cannot cover quantity {}; counter left unchanged",
                variant.id, variant.stock, item.quantity
            );
        }
        if !product_decremented {
            debug!(
                "📉️ Product {} stock ({}) cannot cover quantity {}; counter left unchanged",
                product.id, product.stock, item.quantity
            );
        }
        if policy == StockShortfallPolicy::Reject && !(variant_decremented && product_decremented) {
            return Err(FulfillmentError::InsufficientStock {
                variant_id: variant.id,
                requested: item.quantity,
                available: variant.stock.min(product.stock),
            });
        }
        report.entries.push(StockLedgerEntry {
            variant_id: variant.id,
            product_id: product.id,
            quantity: item.quantity,
            variant_decremented,
            product_decremented,
        });
    }
    Ok(report)
}

async fn decrement_variant_stock(
    variant_id: i64,
    quantity: i64,
    policy: StockShortfallPolicy,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = match policy {
        StockShortfallPolicy::Skip | StockShortfallPolicy::Reject => {
            sqlx::query("UPDATE product_variants SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
                .bind(quantity)
                .bind(variant_id)
                .execute(conn)
                .await?
        },
        StockShortfallPolicy::Clamp => {
            sqlx::query(
                "UPDATE product_variants SET stock = CASE WHEN stock >= $1 THEN stock - $1 ELSE 0 END WHERE id = $2",
            )
            .bind(quantity)
            .bind(variant_id)
            .execute(conn)
            .await?
        },
    };
    Ok(result.rows_affected() > 0)
}

async fn decrement_product_stock(
    product_id: i64,
    quantity: i64,
    policy: StockShortfallPolicy,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = match policy {
        StockShortfallPolicy::Skip | StockShortfallPolicy::Reject => {
            sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
                .bind(quantity)
                .bind(product_id)
                .execute(conn)
                .await?
        },
        StockShortfallPolicy::Clamp => {
            sqlx::query("UPDATE products SET stock = CASE WHEN stock >= $1 THEN stock - $1 ELSE 0 END WHERE id = $2")
                .bind(quantity)
                .bind(product_id)
                .execute(conn)
                .await?
        },
    };
    Ok(result.rows_affected() > 0)
}
