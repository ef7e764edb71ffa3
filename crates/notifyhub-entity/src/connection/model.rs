//! Connection record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::state::ConnectionState;

/// Prefix of the synthetic identity a record carries before binding.
pub const PLACEHOLDER_PREFIX: &str = "TEMP_";

/// Build the placeholder identity for a connection id.
pub fn placeholder_identity(connection_id: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{connection_id}")
}

/// Whether a user identity is a pre-binding placeholder.
pub fn is_placeholder(user_identity: &str) -> bool {
    user_identity.starts_with(PLACEHOLDER_PREFIX)
}

/// One row per physical connection lifetime.
///
/// Records are retired in place and never deleted or reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConnectionRecord {
    /// Surrogate identity, never reused.
    pub id: i64,
    /// Bound user identity, or `TEMP_<connection_id>` before binding.
    pub user_identity: String,
    /// Transport-assigned connection identifier.
    pub connection_id: String,
    /// When the connect event was recorded.
    pub connected_at: DateTime<Utc>,
    /// When the record was retired.
    pub disconnected_at: Option<DateTime<Utc>>,
    /// True from creation until retirement.
    pub is_active: bool,
}

impl ConnectionRecord {
    /// Lifecycle state derived from the stored columns.
    pub fn state(&self) -> ConnectionState {
        if !self.is_active {
            ConnectionState::Retired
        } else if is_placeholder(&self.user_identity) {
            ConnectionState::ConnectedUnbound
        } else {
            ConnectionState::Bound
        }
    }

    /// Whether the record is bound to a real user identity.
    pub fn is_bound(&self) -> bool {
        self.state() == ConnectionState::Bound
    }
}
