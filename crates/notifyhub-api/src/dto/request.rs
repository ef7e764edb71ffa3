//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use notifyhub_entity::notification::CreateNotification;

/// Send notification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    /// Sender identity.
    #[validate(length(min = 1, max = 255, message = "senderId is required"))]
    pub sender_id: String,
    /// Receiver identity.
    #[validate(length(min = 1, max = 255, message = "receiverId is required"))]
    pub receiver_id: String,
    /// Message body.
    #[validate(length(min = 1, max = 1000, message = "message must be 1-1000 characters"))]
    pub message: String,
    /// Notification type.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "type is required"))]
    pub notification_type: String,
}

impl From<SendNotificationRequest> for CreateNotification {
    fn from(req: SendNotificationRequest) -> Self {
        Self {
            sender_id: req.sender_id,
            receiver_id: req.receiver_id,
            message: req.message,
            notification_type: req.notification_type,
        }
    }
}

/// Test message request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestMessageRequest {
    /// Message text.
    #[serde(default)]
    pub message: Option<String>,
}
