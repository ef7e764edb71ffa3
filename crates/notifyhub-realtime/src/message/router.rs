//! Handlers for client frames sent to application destinations.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::MessagePublisher;

/// Topic receiving greetings.
pub const GREETINGS_TOPIC: &str = "/topic/greetings";
/// Topic receiving registration acknowledgements.
pub const REGISTRATION_TOPIC: &str = "/topic/registration";

#[derive(Debug, Deserialize)]
struct HelloMessage {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterMessage {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrivateMessage {
    target_user_id: String,
    #[serde(default)]
    content: String,
}

/// Routes `send` frames addressed below the application prefix.
#[derive(Debug, Clone)]
pub struct AppMessageRouter {
    publisher: Arc<dyn MessagePublisher>,
}

impl AppMessageRouter {
    /// Create a router publishing replies through `publisher`.
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self { publisher }
    }

    /// Handle a message for `path`, the destination with the application
    /// prefix removed (e.g. `/hello`).
    pub async fn route(
        &self,
        connection_id: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> AppResult<()> {
        match path {
            "/hello" => {
                let msg: HelloMessage = parse_body(path, body)?;
                let name = msg.name.unwrap_or_default();
                info!(connection_id = %connection_id, name = %name, "Greeting received");
                let reply = json!({
                    "type": "GREETING",
                    "message": format!("Hello, {name}!"),
                    "timestamp": Utc::now().timestamp_millis(),
                });
                self.publisher.publish(GREETINGS_TOPIC, &reply).await
            }
            "/register" => {
                let msg: RegisterMessage = parse_body(path, body)?;
                info!(
                    connection_id = %connection_id,
                    user_identity = %msg.user_id,
                    "Registration received"
                );
                let reply = json!({
                    "type": "REGISTRATION",
                    "userId": msg.user_id,
                    "status": "SUCCESS",
                    "message": "Registration completed",
                });
                self.publisher.publish(REGISTRATION_TOPIC, &reply).await
            }
            "/private-message" => {
                let msg: PrivateMessage = parse_body(path, body)?;
                info!(
                    connection_id = %connection_id,
                    target_user_identity = %msg.target_user_id,
                    content = %msg.content,
                    "Private message received"
                );
                Ok(())
            }
            other => Err(AppError::not_found(format!(
                "No handler for application destination '{other}'"
            ))),
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(path: &str, body: &serde_json::Value) -> AppResult<T> {
    T::deserialize(body)
        .map_err(|e| AppError::validation(format!("Invalid body for '{path}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyhub_core::error::ErrorKind;

    use crate::delivery::testing::RecordingPublisher;

    #[tokio::test]
    async fn test_hello_publishes_greeting() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = AppMessageRouter::new(publisher.clone());

        router
            .route("c1", "/hello", &json!({"name": "alice"}))
            .await
            .unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, GREETINGS_TOPIC);
        assert_eq!(published[0].1["type"], "GREETING");
        assert_eq!(published[0].1["message"], "Hello, alice!");
    }

    #[tokio::test]
    async fn test_register_publishes_acknowledgement() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = AppMessageRouter::new(publisher.clone());

        router
            .route("c1", "/register", &json!({"userId": "alice"}))
            .await
            .unwrap();

        let published = publisher.published();
        assert_eq!(published[0].0, REGISTRATION_TOPIC);
        assert_eq!(published[0].1["userId"], "alice");
        assert_eq!(published[0].1["status"], "SUCCESS");
    }

    #[tokio::test]
    async fn test_private_message_is_not_published() {
        let publisher = Arc::new(RecordingPublisher::default());
        let router = AppMessageRouter::new(publisher.clone());

        router
            .route(
                "c1",
                "/private-message",
                &json!({"targetUserId": "bob", "content": "hi"}),
            )
            .await
            .unwrap();
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_destinations() {
        let router = AppMessageRouter::new(Arc::new(RecordingPublisher::default()));

        let err = router.route("c1", "/register", &json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = router.route("c1", "/nope", &json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
