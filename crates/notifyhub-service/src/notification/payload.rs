//! Notification payload as seen by clients, over HTTP and WebSocket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notifyhub_entity::notification::Notification;

/// Client-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// Notification ID.
    pub id: i64,
    /// Sender identity.
    pub sender_id: String,
    /// Receiver identity.
    pub receiver_id: String,
    /// Message body.
    pub message: String,
    /// Notification type, e.g. `INFO`.
    #[serde(rename = "type")]
    pub notification_type: String,
    /// Whether the receiver has read it.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            sender_id: n.sender_id,
            receiver_id: n.receiver_id,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let response = NotificationResponse::from(Notification {
            id: 7,
            sender_id: "system".to_string(),
            receiver_id: "alice".to_string(),
            message: "hi".to_string(),
            notification_type: "INFO".to_string(),
            is_read: false,
            created_at: Utc::now(),
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["senderId"], "system");
        assert_eq!(value["receiverId"], "alice");
        assert_eq!(value["type"], "INFO");
        assert_eq!(value["isRead"], false);
        assert!(value.get("createdAt").is_some());
    }
}
