//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::message::types::ServerFrame;

/// Transport-assigned connection identifier.
pub type ConnectionId = String;

/// A handle to a single live socket.
///
/// Holds the sender half of the socket's outbound queue. Dropping every
/// clone of the handle closes the queue, which ends the socket's writer.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Sender for outbound frames
    sender: mpsc::Sender<ServerFrame>,
    /// When the socket was accepted
    pub connected_at: DateTime<Utc>,
    /// Whether the socket is still accepting frames
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerFrame>) -> Self {
        Self {
            id,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame for this socket. Returns `false` if it was dropped.
    pub fn send(&self, frame: ServerFrame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
