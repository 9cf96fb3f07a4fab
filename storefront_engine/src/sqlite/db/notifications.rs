use sqlx::SqliteConnection;

use crate::{
    db_types::{NewNotification, Notification},
    traits::NotificationError,
};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, NotificationError> {
    let notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.title)
    .bind(notification.message)
    .fetch_one(conn)
    .await?;
    Ok(notification)
}

pub async fn fetch_notifications_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, NotificationError> {
    let notifications =
        sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(notifications)
}

pub async fn fetch_all_notifications(conn: &mut SqliteConnection) -> Result<Vec<Notification>, NotificationError> {
    let notifications = sqlx::query_as("SELECT * FROM notifications ORDER BY created_at DESC, id DESC")
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}

pub async fn mark_notification_read(
    notification_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Notification, NotificationError> {
    let notification = sqlx::query_as("UPDATE notifications SET is_read = 1 WHERE id = $1 RETURNING *")
        .bind(notification_id)
        .fetch_optional(conn)
        .await?
        .ok_or(NotificationError::NotFound(notification_id))?;
    Ok(notification)
}
