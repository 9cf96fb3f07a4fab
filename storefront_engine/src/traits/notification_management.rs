use thiserror::Error;

use crate::db_types::{NewNotification, Notification};

/// Recording and querying notification rows. Rows are append-only apart from the mark-read flip.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement: Clone {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;

    /// A user's notifications, newest first.
    async fn fetch_notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError>;

    /// Every notification in the system, newest first. Admin surface.
    async fn fetch_all_notifications(&self) -> Result<Vec<Notification>, NotificationError>;

    /// Flips `is_read` on. Idempotent; returns the updated row.
    async fn mark_notification_read(&self, notification_id: i64) -> Result<Notification, NotificationError>;
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Notification {0} does not exist")]
    NotFound(i64),
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}
