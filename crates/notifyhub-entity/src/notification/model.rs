//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted notification addressed to a receiver identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: i64,
    /// Identity of the sender.
    pub sender_id: String,
    /// Identity of the recipient.
    pub receiver_id: String,
    /// Notification body text.
    pub message: String,
    /// Free-form notification type label.
    pub notification_type: String,
    /// Whether the receiver has read this notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// Data required to create a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Identity of the sender.
    pub sender_id: String,
    /// Identity of the recipient.
    pub receiver_id: String,
    /// Notification body text.
    pub message: String,
    /// Free-form notification type label.
    pub notification_type: String,
}
