//! Publisher doubles for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::MessagePublisher;

/// Records every publish.
#[derive(Debug, Default)]
pub(crate) struct RecordingPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub(crate) fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> AppResult<()> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.clone()));
        Ok(())
    }
}

/// Fails every publish, counting attempts.
#[derive(Debug, Default)]
pub(crate) struct FailingPublisher {
    attempts: Mutex<usize>,
}

impl FailingPublisher {
    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MessagePublisher for FailingPublisher {
    async fn publish(&self, _topic: &str, _payload: &serde_json::Value) -> AppResult<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(AppError::publish("broker unavailable"))
    }
}
