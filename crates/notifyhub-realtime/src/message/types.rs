//! Inbound and outbound WebSocket frame definitions.

use serde::{Deserialize, Serialize};

/// Frames sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Subscribe to a topic.
    Subscribe {
        /// Topic destination.
        destination: String,
    },
    /// Unsubscribe from a topic.
    Unsubscribe {
        /// Topic destination.
        destination: String,
    },
    /// Send a message to an application destination.
    Send {
        /// Application destination, e.g. `/app/hello`.
        destination: String,
        /// Message body.
        #[serde(default)]
        body: serde_json::Value,
    },
    /// Keepalive.
    Ping,
}

/// Frames sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once after the socket is accepted.
    Connected {
        /// Server-assigned connection ID.
        connection_id: String,
    },
    /// Subscription confirmed.
    Subscribed {
        /// Topic destination.
        destination: String,
    },
    /// A message published to a subscribed topic.
    Message {
        /// Topic the message was published to.
        destination: String,
        /// Published payload.
        body: serde_json::Value,
    },
    /// Error report.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
    /// Keepalive reply.
    Pong,
}

impl ServerFrame {
    /// Build an error frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}
