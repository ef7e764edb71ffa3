//! In-memory session registry.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_entity::connection::{ConnectionRecord, placeholder_identity};

use crate::store::SessionRegistry;

#[derive(Debug, Default)]
struct RegistryState {
    /// Last issued surrogate id.
    last_id: i64,
    /// Record id → record, in creation order.
    records: BTreeMap<i64, ConnectionRecord>,
    /// Connection id → id of its active record.
    active_by_connection: HashMap<String, i64>,
}

/// Session registry held in process memory.
///
/// A single lock guards all state, so every operation is atomic and
/// `retire`/`rebind` are serialized.
#[derive(Debug, Default)]
pub struct MemorySessionRegistry {
    state: Mutex<RegistryState>,
}

impl MemorySessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records ever created.
    pub async fn record_count(&self) -> usize {
        self.state.lock().await.records.len()
    }
}

#[async_trait]
impl SessionRegistry for MemorySessionRegistry {
    async fn create(&self, connection_id: &str) -> AppResult<i64> {
        let mut state = self.state.lock().await;
        if state.active_by_connection.contains_key(connection_id) {
            return Err(AppError::duplicate_connection(connection_id));
        }

        state.last_id += 1;
        let id = state.last_id;
        state.records.insert(
            id,
            ConnectionRecord {
                id,
                user_identity: placeholder_identity(connection_id),
                connection_id: connection_id.to_string(),
                connected_at: Utc::now(),
                disconnected_at: None,
                is_active: true,
            },
        );
        state
            .active_by_connection
            .insert(connection_id.to_string(), id);
        Ok(id)
    }

    async fn find_active_by_user(&self, user_identity: &str) -> AppResult<Vec<ConnectionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .values()
            .rev()
            .filter(|r| r.is_active && r.user_identity == user_identity)
            .cloned()
            .collect())
    }

    async fn find_active_by_connection(
        &self,
        connection_id: &str,
    ) -> AppResult<Option<ConnectionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .active_by_connection
            .get(connection_id)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn find_by_id(&self, record_id: i64) -> AppResult<Option<ConnectionRecord>> {
        Ok(self.state.lock().await.records.get(&record_id).cloned())
    }

    async fn retire(&self, record: &ConnectionRecord) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let connection_id = match state.records.get_mut(&record.id) {
            Some(stored) if stored.is_active => {
                stored.is_active = false;
                stored.disconnected_at = Some(Utc::now());
                stored.connection_id.clone()
            }
            _ => return Ok(false),
        };

        if state.active_by_connection.get(&connection_id) == Some(&record.id) {
            state.active_by_connection.remove(&connection_id);
        }
        Ok(true)
    }

    async fn rebind(&self, record: &ConnectionRecord, user_identity: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.records.get_mut(&record.id) {
            Some(stored) if stored.is_active => {
                stored.user_identity = user_identity.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
