//! Publish capability exposed by the transport layer.

use async_trait::async_trait;

use crate::result::AppResult;

/// Topic-addressed publish capability.
///
/// Implementations fan a payload out to every connection subscribed to
/// `topic`. A publish with no subscribers is still a success; only a
/// transport-level failure returns an error.
#[async_trait]
pub trait MessagePublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> AppResult<()>;
}
