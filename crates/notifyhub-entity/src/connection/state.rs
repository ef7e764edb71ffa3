//! Connection lifecycle state.

use serde::{Deserialize, Serialize};

/// Presence lifecycle of a single connection record.
///
/// `ConnectedUnbound -> Bound -> Retired`, with `Bound -> Bound` on
/// rebinding. `Retired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Connected, still carrying the placeholder identity.
    ConnectedUnbound,
    /// Bound to a real user identity.
    Bound,
    /// Retired by disconnect or supersession.
    Retired,
}

impl ConnectionState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectedUnbound => "connected_unbound",
            Self::Bound => "bound",
            Self::Retired => "retired",
        }
    }

    /// Whether the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Retired)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
