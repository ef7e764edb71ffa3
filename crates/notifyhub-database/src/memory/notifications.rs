//! In-memory notification store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use notifyhub_core::result::AppResult;
use notifyhub_entity::notification::{CreateNotification, Notification};

use crate::store::NotificationStore;

#[derive(Debug, Default)]
struct StoreState {
    last_id: i64,
    rows: BTreeMap<i64, Notification>,
}

/// Notification store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    state: RwLock<StoreState>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, filter: F) -> Vec<Notification>
    where
        F: Fn(&Notification) -> bool,
    {
        let state = self.state.read().await;
        state.rows.values().rev().filter(|n| filter(n)).cloned().collect()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let notification = Notification {
            id: state.last_id,
            sender_id: data.sender_id.clone(),
            receiver_id: data.receiver_id.clone(),
            message: data.message.clone(),
            notification_type: data.notification_type.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.rows.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Notification>> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn find_by_receiver(&self, receiver_id: &str) -> AppResult<Vec<Notification>> {
        Ok(self
            .newest_first(|n| n.receiver_id == receiver_id)
            .await)
    }

    async fn find_unread_by_receiver(&self, receiver_id: &str) -> AppResult<Vec<Notification>> {
        Ok(self
            .newest_first(|n| n.receiver_id == receiver_id && n.is_unread())
            .await)
    }

    async fn mark_read(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, receiver_id: &str) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut marked = 0u64;
        for n in state.rows.values_mut() {
            if n.receiver_id == receiver_id && n.is_unread() {
                n.is_read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn count_unread(&self, receiver_id: &str) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|n| n.receiver_id == receiver_id && n.is_unread())
            .count() as i64)
    }
}
