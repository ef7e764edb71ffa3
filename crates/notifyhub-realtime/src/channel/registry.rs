//! Topic registry: which connections are subscribed to each topic.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::subscription::SubscriptionTracker;

/// Registry of topic subscriptions in both directions.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    /// Topic → subscribed connection IDs.
    topics: DashMap<String, HashSet<ConnectionId>>,
    /// Reverse index.
    subscriptions: SubscriptionTracker,
}

impl TopicRegistry {
    /// Creates a new topic registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a topic. Returns `false` if it was
    /// already subscribed.
    pub fn subscribe(&self, topic: &str, conn_id: &str) -> bool {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(conn_id.to_string());
        self.subscriptions.add(conn_id, topic)
    }

    /// Unsubscribes a connection from a topic.
    pub fn unsubscribe(&self, topic: &str, conn_id: &str) -> bool {
        self.detach(topic, conn_id);
        self.subscriptions.remove(conn_id, topic)
    }

    /// Unsubscribes a connection from all topics.
    pub fn unsubscribe_all(&self, conn_id: &str) -> usize {
        let topics = self.subscriptions.remove_all(conn_id);
        for topic in &topics {
            self.detach(topic, conn_id);
        }
        topics.len()
    }

    /// Returns all subscriber connection IDs for a topic.
    pub fn subscribers(&self, topic: &str) -> Vec<ConnectionId> {
        self.topics
            .get(topic)
            .map(|subs| subs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is subscribed to a topic.
    pub fn is_subscribed(&self, topic: &str, conn_id: &str) -> bool {
        self.subscriptions.contains(conn_id, topic)
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: &str) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Returns total number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    fn detach(&self, topic: &str, conn_id: &str) {
        if let Some(mut subs) = self.topics.get_mut(topic) {
            subs.remove(conn_id);
            if subs.is_empty() {
                drop(subs);
                self.topics.remove(topic);
            }
        }
    }
}
