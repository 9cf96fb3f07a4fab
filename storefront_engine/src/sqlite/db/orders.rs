use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus},
    sfe_api::order_objects::OrderQueryFilter,
    sqlite::db::inventory,
    traits::FulfillmentError,
};

/// Inserts an order and its items using the given connection. Not atomic on its own; callers wrap
/// this in a transaction and pass `&mut *tx`.
///
/// Each item's purchase price is read from the variant's current price here, at insert time, so
/// the snapshot and the rows it prices land in the same transaction. A missing variant fails the
/// whole insert.
pub async fn insert_order(
    order: NewOrder,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(Order, Vec<OrderItem>), FulfillmentError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                address_id,
                total_amount,
                discount,
                grand_total,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.address_id)
    .bind(order.total_amount)
    .bind(order.discount)
    .bind(order.grand_total)
    .bind(order.created_at)
    .fetch_one(&mut *conn)
    .await?;
    let mut saved_items = Vec::with_capacity(items.len());
    for item in items {
        let variant = inventory::fetch_variant(item.variant_id, &mut *conn)
            .await?
            .ok_or(FulfillmentError::VariantNotFound(item.variant_id))?;
        let saved: OrderItem = sqlx::query_as(
            r#"
                INSERT INTO order_items (order_id, variant_id, quantity, price_at_purchase)
                VALUES ($1, $2, $3, $4)
                RETURNING *;
            "#,
        )
        .bind(order.id)
        .bind(item.variant_id)
        .bind(item.quantity)
        .bind(variant.price)
        .fetch_one(&mut *conn)
        .await?;
        saved_items.push(saved);
    }
    debug!("📝️ Order #{} inserted with {} items", order.id, saved_items.len());
    Ok((order, saved_items))
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.iter().flatten().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!("order_status IN ({statuses})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ search_orders matched {} orders", orders.len());
    Ok(orders)
}

/// The approval compare-and-set: flips a `PENDING` order to `APPROVED` and stamps the approver.
/// Returns `None` when the order is missing or not `PENDING`, which is how concurrent approval
/// attempts lose.
pub(crate) async fn mark_approved(
    order_id: i64,
    approved_by: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET order_status = 'APPROVED', approved_by = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND order_status = 'PENDING'
            RETURNING *;
        "#,
    )
    .bind(approved_by)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Generic status compare-and-set. Returns `None` when the order is missing or its status is no
/// longer `from`, so a concurrent transition can never be silently overwritten.
pub(crate) async fn update_order_status(
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    let order = sqlx::query_as(
        "UPDATE orders SET order_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND order_status = $3 \
         RETURNING *",
    )
    .bind(to)
    .bind(order_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
