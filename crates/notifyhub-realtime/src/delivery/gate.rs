//! Delivery gate: publish to a user's topic only while they are reachable.
//!
//! Reachability is decided from registry state keyed by user identity.
//! Fan-out to the sockets subscribed to the topic is left entirely to the
//! publisher. The check and the publish are two separate steps, so a send
//! racing a disconnect may still report `true`.

use std::sync::Arc;

use tracing::{debug, error, warn};

use notifyhub_core::traits::MessagePublisher;

use crate::presence::tracker::PresenceTracker;

/// Gates publishes on user presence.
#[derive(Debug, Clone)]
pub struct DeliveryGate {
    presence: Arc<PresenceTracker>,
    publisher: Arc<dyn MessagePublisher>,
}

impl DeliveryGate {
    /// Create a gate over a presence tracker and a publish capability.
    pub fn new(presence: Arc<PresenceTracker>, publisher: Arc<dyn MessagePublisher>) -> Self {
        Self {
            presence,
            publisher,
        }
    }

    /// Publish `payload` to `topic` if `user_identity` has an active
    /// session.
    ///
    /// Returns `true` once the publisher accepted the message. An
    /// unreachable user, a failed presence lookup and a failed publish all
    /// return `false`; nothing is queued or retried.
    pub async fn send_to_user(
        &self,
        user_identity: &str,
        topic: &str,
        payload: &serde_json::Value,
    ) -> bool {
        let sessions = match self.presence.active_sessions(user_identity).await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!(user_identity = %user_identity, error = %e, "Presence lookup failed");
                return false;
            }
        };

        if sessions.is_empty() {
            warn!(user_identity = %user_identity, topic = %topic, "User not connected, message not sent");
            return false;
        }

        match self.publisher.publish(topic, payload).await {
            Ok(()) => {
                debug!(
                    user_identity = %user_identity,
                    topic = %topic,
                    sessions = sessions.len(),
                    "Message published"
                );
                true
            }
            Err(e) => {
                warn!(
                    user_identity = %user_identity,
                    topic = %topic,
                    error = %e,
                    "Publish failed"
                );
                false
            }
        }
    }
}
