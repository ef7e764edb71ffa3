//! Transport events → presence transitions.
//!
//! Receives connect/subscribe/disconnect events from the transport,
//! extracts the user identity from notification topic destinations, and
//! applies the configured supersession policy to the sockets behind
//! superseded records.

use std::sync::Arc;

use tracing::{debug, info};

use notifyhub_core::config::{RealtimeConfig, SupersessionPolicy};
use notifyhub_core::result::AppResult;
use notifyhub_entity::connection::is_placeholder;

use crate::presence::tracker::{BindOutcome, PresenceTracker};

use super::topic_broker::TopicBroker;

/// Extract the user identity from a notification topic destination.
///
/// Returns `None` when `destination` is not `<prefix>/<identity>` with a
/// non-empty identity, or when the identity is a connection placeholder.
/// A trailing `/` on the prefix is optional.
pub fn user_identity_from_destination<'a>(prefix: &str, destination: &'a str) -> Option<&'a str> {
    let base = prefix.trim_end_matches('/');
    let identity = destination.strip_prefix(base)?.strip_prefix('/')?;
    (!identity.is_empty() && !is_placeholder(identity)).then_some(identity)
}

/// Bridges transport events into the presence tracker.
#[derive(Debug)]
pub struct EventBridge {
    presence: Arc<PresenceTracker>,
    broker: Arc<TopicBroker>,
    topic_prefix: String,
    supersession_policy: SupersessionPolicy,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(presence: Arc<PresenceTracker>, broker: Arc<TopicBroker>, config: &RealtimeConfig) -> Self {
        Self {
            presence,
            broker,
            topic_prefix: config.notification_topic_prefix.clone(),
            supersession_policy: config.supersession_policy,
        }
    }

    /// Handle a connect event
    pub async fn on_connect(&self, connection_id: &str) -> AppResult<()> {
        self.presence.on_connect(connection_id).await.map(|_| ())
    }

    /// Handle a subscribe event.
    ///
    /// Destinations outside the notification topic prefix are ignored and
    /// yield `None`.
    pub async fn on_subscribe(&self, connection_id: &str, destination: &str) -> AppResult<Option<BindOutcome>> {
        let Some(user_identity) = user_identity_from_destination(&self.topic_prefix, destination) else {
            debug!(
                connection_id = %connection_id,
                destination = %destination,
                "Subscription outside notification topics, presence unchanged"
            );
            return Ok(None);
        };

        let outcome = self.presence.on_subscribe(connection_id, user_identity).await?;

        if self.supersession_policy == SupersessionPolicy::CloseTransport {
            for record in &outcome.superseded {
                if record.connection_id == connection_id {
                    continue;
                }
                if self
                    .broker
                    .close_connection(&record.connection_id, "Session superseded by a newer connection")
                {
                    info!(
                        user_identity = %user_identity,
                        connection_id = %record.connection_id,
                        "Closed superseded socket"
                    );
                }
            }
        }

        Ok(Some(outcome))
    }

    /// Handle a disconnect event
    pub async fn on_disconnect(&self, connection_id: &str) -> AppResult<()> {
        self.presence.on_disconnect(connection_id).await.map(|_| ())
    }

    /// The notification topic for a user identity.
    pub fn user_topic(&self, user_identity: &str) -> String {
        format!("{}/{}", self.topic_prefix.trim_end_matches('/'), user_identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyhub_core::config::DuplicateConnectionPolicy;
    use notifyhub_database::memory::MemorySessionRegistry;

    fn bridge(policy: SupersessionPolicy) -> (EventBridge, Arc<PresenceTracker>, Arc<TopicBroker>) {
        let config = RealtimeConfig {
            supersession_policy: policy,
            ..RealtimeConfig::default()
        };
        let presence = Arc::new(PresenceTracker::new(
            Arc::new(MemorySessionRegistry::new()),
            DuplicateConnectionPolicy::Ignore,
        ));
        let broker = Arc::new(TopicBroker::new(&config));
        (
            EventBridge::new(presence.clone(), broker.clone(), &config),
            presence,
            broker,
        )
    }

    #[test]
    fn test_user_identity_from_destination() {
        let prefix = "/topic/notifications/";
        assert_eq!(
            user_identity_from_destination(prefix, "/topic/notifications/alice"),
            Some("alice")
        );
        assert_eq!(
            user_identity_from_destination("/topic/notifications", "/topic/notifications/alice"),
            Some("alice")
        );
        assert_eq!(user_identity_from_destination(prefix, "/topic/notifications/"), None);
        assert_eq!(user_identity_from_destination(prefix, "/topic/greetings"), None);
        assert_eq!(user_identity_from_destination(prefix, "/topic/notificationsalice"), None);
        assert_eq!(user_identity_from_destination(prefix, "/topic/notifications/TEMP_s2"), None);
    }

    #[tokio::test]
    async fn test_placeholder_destination_leaves_other_connection_active() {
        let (bridge, presence, _) = bridge(SupersessionPolicy::RegistryOnly);
        bridge.on_connect("s2").await.unwrap();
        bridge.on_connect("s1").await.unwrap();

        let outcome = bridge
            .on_subscribe("s1", "/topic/notifications/TEMP_s2")
            .await
            .unwrap();
        assert!(outcome.is_none());

        let s2 = presence.connection("s2").await.unwrap().unwrap();
        assert!(s2.is_active);
        assert_eq!(s2.user_identity, "TEMP_s2");
    }

    #[tokio::test]
    async fn test_non_matching_destination_is_ignored() {
        let (bridge, presence, _) = bridge(SupersessionPolicy::RegistryOnly);
        bridge.on_connect("s1").await.unwrap();

        assert!(bridge.on_subscribe("s1", "/topic/greetings").await.unwrap().is_none());
        let record = presence.connection("s1").await.unwrap().unwrap();
        assert_eq!(record.user_identity, "TEMP_s1");
    }

    #[tokio::test]
    async fn test_subscribe_binds_from_destination() {
        let (bridge, presence, _) = bridge(SupersessionPolicy::RegistryOnly);
        bridge.on_connect("s1").await.unwrap();
        bridge
            .on_subscribe("s1", "/topic/notifications/alice")
            .await
            .unwrap();

        let sessions = presence.active_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].connection_id, "s1");
    }

    #[tokio::test]
    async fn test_registry_only_keeps_old_socket_open() {
        let (bridge, presence, broker) = bridge(SupersessionPolicy::RegistryOnly);
        let _rx1 = broker.register("s1").unwrap();
        let _rx2 = broker.register("s2").unwrap();

        bridge.on_connect("s1").await.unwrap();
        bridge.on_subscribe("s1", "/topic/notifications/alice").await.unwrap();
        bridge.on_connect("s2").await.unwrap();
        let outcome = bridge
            .on_subscribe("s2", "/topic/notifications/alice")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.superseded.len(), 1);
        assert_eq!(broker.connection_count(), 2);
        let sessions = presence.active_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].connection_id, "s2");
    }

    #[tokio::test]
    async fn test_close_transport_closes_old_socket() {
        let (bridge, _, broker) = bridge(SupersessionPolicy::CloseTransport);
        let mut rx1 = broker.register("s1").unwrap();
        let _rx2 = broker.register("s2").unwrap();

        bridge.on_connect("s1").await.unwrap();
        bridge.on_subscribe("s1", "/topic/notifications/alice").await.unwrap();
        bridge.on_connect("s2").await.unwrap();
        bridge.on_subscribe("s2", "/topic/notifications/alice").await.unwrap();

        assert_eq!(broker.connection_count(), 1);
        assert!(matches!(
            rx1.recv().await,
            Some(crate::message::types::ServerFrame::Error { .. })
        ));
        assert_eq!(rx1.recv().await, None);
    }

    #[tokio::test]
    async fn test_disconnect_events() {
        let (bridge, presence, _) = bridge(SupersessionPolicy::RegistryOnly);
        bridge.on_connect("s1").await.unwrap();
        bridge.on_subscribe("s1", "/topic/notifications/alice").await.unwrap();

        bridge.on_disconnect("s1").await.unwrap();
        bridge.on_disconnect("s1").await.unwrap();
        assert!(!presence.is_reachable("alice").await.unwrap());
    }

    #[test]
    fn test_user_topic() {
        let (bridge, _, _) = bridge(SupersessionPolicy::RegistryOnly);
        assert_eq!(bridge.user_topic("alice"), "/topic/notifications/alice");
    }
}
