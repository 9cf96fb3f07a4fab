use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, NewNotification, Notification},
    sfe_api::errors::NotificationApiError,
    traits::NotificationManagement,
};

/// The notification inbox: fetching a user's notifications, marking them read, and composing a
/// direct notification (an admin surface; lifecycle notifications are emitted by the order flow
/// itself).
pub struct NotificationApi<B> {
    db: B,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// A user's notifications, newest first.
    pub async fn notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, NotificationApiError> {
        Ok(self.db.fetch_notifications_for_user(user_id).await?)
    }

    /// Every notification in the system, newest first.
    pub async fn all_notifications(&self) -> Result<Vec<Notification>, NotificationApiError> {
        Ok(self.db.fetch_all_notifications().await?)
    }

    /// Marks a notification as read. Idempotent.
    pub async fn mark_as_read(&self, notification_id: i64) -> Result<Notification, NotificationApiError> {
        Ok(self.db.mark_notification_read(notification_id).await?)
    }

    /// Sends a hand-composed notification to a user.
    pub async fn send_direct(
        &self,
        actor: &Actor,
        notification: NewNotification,
    ) -> Result<Notification, NotificationApiError> {
        if notification.title.trim().is_empty() || notification.message.trim().is_empty() {
            return Err(NotificationApiError::MissingFields);
        }
        let recipient = notification.user_id;
        let result = self.db.insert_notification(notification).await?;
        debug!("📬️ {actor} sent a direct notification to user {recipient}");
        Ok(result)
    }
}
