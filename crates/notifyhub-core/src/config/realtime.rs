//! Real-time presence and WebSocket transport configuration.

use serde::{Deserialize, Serialize};

/// How a connect event for an already-active connection id is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateConnectionPolicy {
    /// Leave the registry unchanged and log the event.
    #[default]
    Ignore,
    /// Surface the duplicate to the caller as an error.
    Reject,
}

/// What happens to the transport connection behind a superseded record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersessionPolicy {
    /// Retire the old registry record only; the old socket stays open and
    /// keeps receiving publishes on its topics.
    #[default]
    RegistryOnly,
    /// Also close the old socket at the transport.
    CloseTransport,
}

/// Real-time engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Destination prefix whose remainder is the subscribing user identity.
    #[serde(default = "default_topic_prefix")]
    pub notification_topic_prefix: String,
    /// Destination prefix for client frames routed to application handlers.
    #[serde(default = "default_application_prefix")]
    pub application_prefix: String,
    /// Handling of duplicate connect events.
    #[serde(default)]
    pub duplicate_connection_policy: DuplicateConnectionPolicy,
    /// Handling of the socket behind a superseded record.
    #[serde(default)]
    pub supersession_policy: SupersessionPolicy,
    /// Outbound buffer size per socket.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum topic subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            notification_topic_prefix: default_topic_prefix(),
            application_prefix: default_application_prefix(),
            duplicate_connection_policy: DuplicateConnectionPolicy::default(),
            supersession_policy: SupersessionPolicy::default(),
            channel_buffer_size: default_channel_buffer(),
            max_subscriptions_per_connection: default_max_subscriptions(),
        }
    }
}

impl RealtimeConfig {
    /// Build the notification topic for a user identity.
    pub fn user_topic(&self, user_identity: &str) -> String {
        format!("{}{}", self.notification_topic_prefix, user_identity)
    }
}

fn default_topic_prefix() -> String {
    "/topic/notifications/".to_string()
}

fn default_application_prefix() -> String {
    "/app".to_string()
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_subscriptions() -> usize {
    50
}
