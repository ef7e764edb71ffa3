//! Connection pool: all live sockets indexed by connection ID.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all live WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. Returns `false` if the ID is already live.
    pub fn add(&self, handle: Arc<ConnectionHandle>) -> bool {
        match self.by_id.entry(handle.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Removes and returns every connection.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let ids: Vec<ConnectionId> = self.by_id.iter().map(|e| e.key().clone()).collect();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(id: &str) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ConnectionHandle::new(id.to_string(), tx))
    }

    #[test]
    fn test_add_rejects_live_id() {
        let pool = ConnectionPool::new();
        assert!(pool.add(handle("c1")));
        assert!(!pool.add(handle("c1")));
        assert_eq!(pool.connection_count(), 1);
    }

    #[test]
    fn test_remove_and_drain() {
        let pool = ConnectionPool::new();
        pool.add(handle("c1"));
        pool.add(handle("c2"));

        assert!(pool.remove("c1").is_some());
        assert!(pool.remove("c1").is_none());
        assert_eq!(pool.drain().len(), 1);
        assert_eq!(pool.connection_count(), 0);
    }
}
