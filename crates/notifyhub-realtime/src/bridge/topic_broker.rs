//! In-process topic broker for single-node deployments.
//!
//! Owns the live sockets and their topic subscriptions, and implements
//! the publish capability by fanning a payload out to every socket
//! subscribed to the topic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use notifyhub_core::config::RealtimeConfig;
use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::MessagePublisher;

use crate::channel::registry::TopicRegistry;
use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::message::types::ServerFrame;

/// Topic-addressed fan-out over live sockets.
#[derive(Debug)]
pub struct TopicBroker {
    pool: ConnectionPool,
    topics: TopicRegistry,
    buffer_size: usize,
    max_subscriptions: usize,
    closed: AtomicBool,
}

impl TopicBroker {
    /// Create a broker sized from the realtime configuration.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            topics: TopicRegistry::new(),
            buffer_size: config.channel_buffer_size.max(1),
            max_subscriptions: config.max_subscriptions_per_connection,
            closed: AtomicBool::new(false),
        }
    }

    /// Register a socket, returning the receiver for its outbound frames.
    pub fn register(&self, connection_id: &str) -> AppResult<mpsc::Receiver<ServerFrame>> {
        if self.is_closed() {
            return Err(AppError::service_unavailable("Broker is shut down"));
        }

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(ConnectionHandle::new(connection_id.to_string(), tx));
        if !self.pool.add(handle) {
            return Err(AppError::conflict(format!(
                "Socket '{connection_id}' is already registered"
            )));
        }
        debug!(connection_id = %connection_id, "Socket registered");
        Ok(rx)
    }

    /// Remove a socket and all of its subscriptions.
    pub fn unregister(&self, connection_id: &str) -> bool {
        let removed = self.pool.remove(connection_id);
        let topics = self.topics.unsubscribe_all(connection_id);
        match removed {
            Some(handle) => {
                handle.mark_dead();
                debug!(connection_id = %connection_id, topics, "Socket unregistered");
                true
            }
            None => false,
        }
    }

    /// Subscribe a socket to a topic. Returns `false` if it was already
    /// subscribed.
    pub fn subscribe(&self, connection_id: &str, topic: &str) -> AppResult<bool> {
        if self.pool.get(connection_id).is_none() {
            return Err(AppError::not_found(format!(
                "Socket '{connection_id}' is not registered"
            )));
        }
        if self.topics.is_subscribed(topic, connection_id) {
            return Ok(false);
        }
        if self.topics.subscription_count(connection_id) >= self.max_subscriptions {
            return Err(AppError::validation(format!(
                "Maximum subscriptions ({}) reached",
                self.max_subscriptions
            )));
        }
        Ok(self.topics.subscribe(topic, connection_id))
    }

    /// Unsubscribe a socket from a topic.
    pub fn unsubscribe(&self, connection_id: &str, topic: &str) -> bool {
        self.topics.unsubscribe(topic, connection_id)
    }

    /// Queue a frame for one socket.
    pub fn send_to(&self, connection_id: &str, frame: ServerFrame) -> bool {
        self.pool
            .get(connection_id)
            .is_some_and(|handle| handle.send(frame))
    }

    /// Close a socket at the transport: a final error frame is queued and
    /// the socket is removed, which ends its writer once drained.
    pub fn close_connection(&self, connection_id: &str, reason: &str) -> bool {
        let Some(handle) = self.pool.get(connection_id) else {
            return false;
        };
        handle.send(ServerFrame::error("CONNECTION_CLOSED", reason));
        let closed = self.unregister(connection_id);
        if closed {
            info!(connection_id = %connection_id, reason = %reason, "Socket closed by server");
        }
        closed
    }

    /// Close every socket and refuse further registrations and publishes.
    pub fn close_all(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        let handles = self.pool.drain();
        for handle in &handles {
            handle.send(ServerFrame::error("SERVER_SHUTDOWN", "Server is shutting down"));
            handle.mark_dead();
            self.topics.unsubscribe_all(&handle.id);
        }
        info!(count = handles.len(), "All sockets closed");
        handles.len()
    }

    /// Whether the broker has been shut down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of live sockets.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of sockets subscribed to a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.subscribers(topic).len()
    }

    /// Whether a socket is subscribed to a topic.
    pub fn is_subscribed(&self, connection_id: &str, topic: &str) -> bool {
        self.topics.is_subscribed(topic, connection_id)
    }
}

#[async_trait]
impl MessagePublisher for TopicBroker {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::publish(format!(
                "Cannot publish to '{topic}': broker is shut down"
            )));
        }

        let subscribers = self.topics.subscribers(topic);
        let mut delivered = 0usize;
        for connection_id in &subscribers {
            let frame = ServerFrame::Message {
                destination: topic.to_string(),
                body: payload.clone(),
            };
            if self.send_to(connection_id, frame) {
                delivered += 1;
            }
        }

        debug!(
            topic = %topic,
            subscribers = subscribers.len(),
            delivered,
            "Published to topic"
        );
        Ok(())
    }
}
