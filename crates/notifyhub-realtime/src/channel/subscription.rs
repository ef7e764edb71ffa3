//! Subscription tracking: which topics each connection is subscribed to.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-topic subscription mappings (reverse index).
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_topics: DashMap<ConnectionId, HashSet<String>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription. Returns `false` if it already existed.
    pub fn add(&self, conn_id: &str, topic: &str) -> bool {
        self.conn_to_topics
            .entry(conn_id.to_string())
            .or_default()
            .insert(topic.to_string())
    }

    /// Removes a subscription. Returns `false` if it did not exist.
    pub fn remove(&self, conn_id: &str, topic: &str) -> bool {
        let Some(mut topics) = self.conn_to_topics.get_mut(conn_id) else {
            return false;
        };
        let removed = topics.remove(topic);
        if topics.is_empty() {
            drop(topics);
            self.conn_to_topics.remove(conn_id);
        }
        removed
    }

    /// Whether a connection holds a subscription to a topic.
    pub fn contains(&self, conn_id: &str, topic: &str) -> bool {
        self.conn_to_topics
            .get(conn_id)
            .is_some_and(|topics| topics.contains(topic))
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: &str) -> usize {
        self.conn_to_topics
            .get(conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: &str) -> HashSet<String> {
        self.conn_to_topics
            .remove(conn_id)
            .map(|(_, topics)| topics)
            .unwrap_or_default()
    }
}
