// Notifications: appended by placement, settlement and admin broadcasts,
// mutated afterwards only through the read flag.

use chrono::Utc;
use tracing::info;

use super::Sportsbook;
use crate::error::StoreError;
use crate::ids::generate_id;
use crate::models::{NewNotification, Notification};

impl Sportsbook {
    /// Append without committing; callers commit once for the whole transition
    pub(crate) fn push_notification(&mut self, payload: NewNotification) -> Notification {
        let notification = Notification {
            id: generate_id(),
            user_id: payload.user_id,
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            timestamp: Utc::now(),
            read: false,
        };
        self.notifications.push(notification.clone());
        notification
    }

    pub fn add_notification(&mut self, payload: NewNotification) -> Notification {
        let notification = self.push_notification(payload);
        self.commit();
        info!(user = %notification.user_id, kind = ?notification.kind, "📣 Notification added");
        notification
    }

    pub fn mark_as_read(&mut self, notification_id: &str) -> Result<(), StoreError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| StoreError::NotificationNotFound(notification_id.to_string()))?;
        notification.read = true;
        self.commit();
        Ok(())
    }

    /// Marks every notification in the book, whoever it belongs to.
    /// Returns how many flipped from unread.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut flipped = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            flipped += 1;
        }
        self.commit();
        flipped
    }
}
