//! Synthetic test notifications pushed straight through the delivery gate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use notifyhub_realtime::RealtimeEngine;

/// ID carried by every test payload.
pub const TEST_MESSAGE_ID: i64 = 999;
/// Sender of every test payload.
pub const TEST_MESSAGE_SENDER: &str = "SYSTEM";

/// Outcome status of a test send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMessageStatus {
    /// The gate published the payload.
    Success,
    /// The user was unreachable or the publish failed.
    Error,
}

/// Result reported to the caller of a test send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessageResult {
    /// Outcome status.
    pub status: TestMessageStatus,
    /// Human-readable outcome.
    pub message: String,
}

/// Sends unpersisted test notifications.
#[derive(Debug, Clone)]
pub struct TestMessageService {
    realtime: RealtimeEngine,
}

impl TestMessageService {
    /// Creates a new test message service.
    pub fn new(realtime: RealtimeEngine) -> Self {
        Self { realtime }
    }

    /// Push a test notification to `user_identity`'s topic.
    pub async fn send_test_message(&self, user_identity: &str, message: Option<String>) -> TestMessageResult {
        let payload = json!({
            "id": TEST_MESSAGE_ID,
            "senderId": TEST_MESSAGE_SENDER,
            "receiverId": user_identity,
            "message": message,
            "type": "TEST",
            "isRead": false,
            "createdAt": Utc::now(),
        });

        let topic = self.realtime.user_topic(user_identity);
        if self.realtime.gate.send_to_user(user_identity, &topic, &payload).await {
            info!(user_identity = %user_identity, "Test message sent");
            TestMessageResult {
                status: TestMessageStatus::Success,
                message: "Test message sent.".to_string(),
            }
        } else {
            TestMessageResult {
                status: TestMessageStatus::Error,
                message: format!("User is not connected: {user_identity}"),
            }
        }
    }
}
