//! Shared setup for the integration tests: a throwaway SQLite database per test, plus seeding
//! helpers for the tables the engine reads but does not manage (users, catalog, coupons).
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use storefront_engine::SqliteDatabase;

pub async fn prepare_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    let path = std::env::temp_dir().join(format!("sfe_test_{}.db", rand::random::<u64>()));
    let url = format!("sqlite://{}", path.display());
    let db = SqliteDatabase::new_with_url(&url, 16).await.expect("Error creating test database");
    sqlx::migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running migrations");
    db
}

pub async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("Error seeding user");
    id
}

pub async fn seed_product(pool: &SqlitePool, name: &str, stock: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO products (name, stock) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(stock)
        .fetch_one(pool)
        .await
        .expect("Error seeding product");
    id
}

pub async fn seed_variant(pool: &SqlitePool, product_id: i64, sku: &str, price: &str, stock: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO product_variants (product_id, sku, name, price, stock) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(product_id)
    .bind(sku)
    .bind(sku)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Error seeding variant");
    id
}

pub async fn seed_coupon(
    pool: &SqlitePool,
    code: &str,
    discount_type: &str,
    value: &str,
    min_amount: &str,
    expires_at: DateTime<Utc>,
    usage_limit: i64,
) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO coupons (code, discount_type, value, min_amount, expires_at, usage_limit) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(code)
    .bind(discount_type)
    .bind(value)
    .bind(min_amount)
    .bind(expires_at)
    .bind(usage_limit)
    .fetch_one(pool)
    .await
    .expect("Error seeding coupon");
    id
}

pub async fn variant_stock(pool: &SqlitePool, variant_id: i64) -> i64 {
    let (stock,): (i64,) = sqlx::query_as("SELECT stock FROM product_variants WHERE id = $1")
        .bind(variant_id)
        .fetch_one(pool)
        .await
        .expect("Error reading variant stock");
    stock
}

pub async fn product_stock(pool: &SqlitePool, product_id: i64) -> i64 {
    let (stock,): (i64,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("Error reading product stock");
    stock
}

pub async fn order_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(pool).await.expect("Error counting orders");
    count
}

pub async fn payment_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM payments").fetch_one(pool).await.expect("Error counting payments");
    count
}

pub async fn notification_count(pool: &SqlitePool, user_id: i64) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Error counting notifications");
    count
}
