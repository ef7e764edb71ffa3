//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notifyhub_entity::connection::ConnectionRecord;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: i64,
}

/// Result of marking one notification read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    /// Whether a notification with that ID existed.
    pub updated: bool,
}

/// Result of marking all notifications read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    /// Number of notifications marked.
    pub marked: u64,
}

/// One active connection record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Record ID.
    pub record_id: i64,
    /// Connection ID.
    pub connection_id: String,
    /// Connected at.
    pub connected_at: DateTime<Utc>,
}

impl From<ConnectionRecord> for SessionResponse {
    fn from(r: ConnectionRecord) -> Self {
        Self {
            record_id: r.id,
            connection_id: r.connection_id,
            connected_at: r.connected_at,
        }
    }
}

/// Presence of one user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    /// User identity.
    pub user_id: String,
    /// Whether a send would currently be attempted.
    pub reachable: bool,
    /// Active records, newest first.
    pub sessions: Vec<SessionResponse>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Store backend in use.
    pub store: String,
    /// Store connectivity.
    pub database: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
}
