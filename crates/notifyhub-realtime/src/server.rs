//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use notifyhub_core::config::RealtimeConfig;
use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_database::store::SessionRegistry;

use crate::bridge::event_bridge::EventBridge;
use crate::bridge::topic_broker::TopicBroker;
use crate::connection::handle::ConnectionId;
use crate::delivery::gate::DeliveryGate;
use crate::message::router::AppMessageRouter;
use crate::message::types::{ClientFrame, ServerFrame};
use crate::presence::tracker::PresenceTracker;

/// Central real-time engine that coordinates the WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Live sockets and topic fan-out.
    pub broker: Arc<TopicBroker>,
    /// Connection record state machine.
    pub presence: Arc<PresenceTracker>,
    /// Presence-gated delivery.
    pub gate: DeliveryGate,
    /// Transport events → presence.
    pub bridge: Arc<EventBridge>,
    router: AppMessageRouter,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.broker.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine over a session registry.
    pub fn new(config: RealtimeConfig, registry: Arc<dyn SessionRegistry>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let broker = Arc::new(TopicBroker::new(&config));
        let presence = Arc::new(PresenceTracker::new(registry, config.duplicate_connection_policy));
        let gate = DeliveryGate::new(presence.clone(), broker.clone());
        let bridge = Arc::new(EventBridge::new(presence.clone(), broker.clone(), &config));
        let router = AppMessageRouter::new(broker.clone());

        info!(
            topic_prefix = %config.notification_topic_prefix,
            supersession_policy = ?config.supersession_policy,
            duplicate_connection_policy = ?config.duplicate_connection_policy,
            "Real-time engine initialized"
        );

        Self {
            broker,
            presence,
            gate,
            bridge,
            router,
            config,
            shutdown_tx,
        }
    }

    /// Accept a new socket under a fresh connection ID.
    pub async fn connect(&self) -> AppResult<(ConnectionId, mpsc::Receiver<ServerFrame>)> {
        let connection_id = Uuid::new_v4().to_string();
        let rx = self.connect_with_id(&connection_id).await?;
        Ok((connection_id, rx))
    }

    /// Accept a new socket under a transport-chosen connection ID.
    ///
    /// The socket is registered with the broker, the connect event is
    /// recorded, and a `connected` frame is queued.
    pub async fn connect_with_id(&self, connection_id: &str) -> AppResult<mpsc::Receiver<ServerFrame>> {
        let rx = self.broker.register(connection_id)?;

        if let Err(e) = self.bridge.on_connect(connection_id).await {
            self.broker.unregister(connection_id);
            warn!(connection_id = %connection_id, error = %e, "Connect rejected");
            return Err(e);
        }

        self.broker.send_to(
            connection_id,
            ServerFrame::Connected {
                connection_id: connection_id.to_string(),
            },
        );
        info!(connection_id = %connection_id, "WebSocket connection established");
        Ok(rx)
    }

    /// Process a raw text frame from a socket.
    pub async fn handle_inbound(&self, connection_id: &str, raw: &str) {
        match serde_json::from_str::<ClientFrame>(raw) {
            Ok(frame) => self.handle_frame(connection_id, frame).await,
            Err(e) => {
                self.broker.send_to(
                    connection_id,
                    ServerFrame::error("INVALID_FRAME", format!("Failed to parse frame: {e}")),
                );
            }
        }
    }

    /// Process a parsed client frame.
    pub async fn handle_frame(&self, connection_id: &str, frame: ClientFrame) {
        match frame {
            ClientFrame::Subscribe { destination } => {
                self.handle_subscribe(connection_id, &destination).await;
            }
            ClientFrame::Unsubscribe { destination } => {
                self.broker.unsubscribe(connection_id, &destination);
                debug!(connection_id = %connection_id, destination = %destination, "Unsubscribed");
            }
            ClientFrame::Send { destination, body } => {
                self.handle_send(connection_id, &destination, &body).await;
            }
            ClientFrame::Ping => {
                self.broker.send_to(connection_id, ServerFrame::Pong);
            }
        }
    }

    async fn handle_subscribe(&self, connection_id: &str, destination: &str) {
        if let Err(e) = self.broker.subscribe(connection_id, destination) {
            self.reply_error(connection_id, &e);
            return;
        }

        if let Err(e) = self.bridge.on_subscribe(connection_id, destination).await {
            error!(
                connection_id = %connection_id,
                destination = %destination,
                error = %e,
                "Failed to record subscription"
            );
            self.reply_error(connection_id, &e);
            return;
        }

        self.broker.send_to(
            connection_id,
            ServerFrame::Subscribed {
                destination: destination.to_string(),
            },
        );
    }

    async fn handle_send(&self, connection_id: &str, destination: &str, body: &serde_json::Value) {
        let base = self.config.application_prefix.trim_end_matches('/');
        let path = destination
            .strip_prefix(base)
            .filter(|rest| rest.starts_with('/'));

        let result = match path {
            Some(path) => self.router.route(connection_id, path, body).await,
            None => Err(AppError::not_found(format!(
                "Destination '{destination}' is not an application destination"
            ))),
        };

        if let Err(e) = result {
            debug!(connection_id = %connection_id, destination = %destination, error = %e, "Send rejected");
            self.reply_error(connection_id, &e);
        }
    }

    fn reply_error(&self, connection_id: &str, err: &AppError) {
        self.broker.send_to(
            connection_id,
            ServerFrame::error(err.kind.to_string(), err.message.clone()),
        );
    }

    /// Tear down a socket and record the disconnect event.
    pub async fn disconnect(&self, connection_id: &str) {
        self.broker.unregister(connection_id);
        if let Err(e) = self.bridge.on_disconnect(connection_id).await {
            error!(connection_id = %connection_id, error = %e, "Failed to record disconnect");
        }
        info!(connection_id = %connection_id, "WebSocket connection closed");
    }

    /// The notification topic for a user identity.
    pub fn user_topic(&self, user_identity: &str) -> String {
        self.bridge.user_topic(user_identity)
    }

    /// Realtime configuration in effect.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        let closed = self.broker.close_all();
        info!(closed, "Real-time engine shut down");
        Ok(())
    }
}
