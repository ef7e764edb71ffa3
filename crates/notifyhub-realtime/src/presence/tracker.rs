//! Presence tracker: the connection record state machine.
//!
//! A connection's record moves `ConnectedUnbound → Bound → Retired`.
//! Binding a user identity retires every other active record already
//! bound to that identity, so the registry holds at most one active
//! bound record per user. Events that reference a connection with no
//! active record are benign no-ops.

use std::sync::Arc;

use tracing::{debug, info, warn};

use notifyhub_core::config::DuplicateConnectionPolicy;
use notifyhub_core::result::AppResult;
use notifyhub_database::store::SessionRegistry;
use notifyhub_entity::connection::{ConnectionRecord, is_placeholder};

/// Result of binding a connection to a user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindOutcome {
    /// Records retired because the identity was bound to them.
    pub superseded: Vec<ConnectionRecord>,
    /// The subscribing connection's record, now bound. `None` when the
    /// connection had no active record.
    pub bound: Option<ConnectionRecord>,
}

/// Drives connection records through their lifecycle.
#[derive(Debug)]
pub struct PresenceTracker {
    registry: Arc<dyn SessionRegistry>,
    duplicate_policy: DuplicateConnectionPolicy,
}

impl PresenceTracker {
    /// Create a tracker over a session registry.
    pub fn new(registry: Arc<dyn SessionRegistry>, duplicate_policy: DuplicateConnectionPolicy) -> Self {
        Self {
            registry,
            duplicate_policy,
        }
    }

    /// Record a new connection with its placeholder identity.
    ///
    /// Returns the new record ID, or `None` when the connection already
    /// had an active record and the policy is to ignore duplicates.
    pub async fn on_connect(&self, connection_id: &str) -> AppResult<Option<i64>> {
        match self.registry.create(connection_id).await {
            Ok(record_id) => {
                info!(connection_id = %connection_id, record_id, "Connection recorded");
                Ok(Some(record_id))
            }
            Err(e) if e.is_duplicate_connection() => match self.duplicate_policy {
                DuplicateConnectionPolicy::Ignore => {
                    warn!(connection_id = %connection_id, "Duplicate connect event ignored");
                    Ok(None)
                }
                DuplicateConnectionPolicy::Reject => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Bind a connection to `user_identity`, retiring the identity's
    /// previous active records first.
    ///
    /// Placeholder identities are never bound; such a subscribe leaves the
    /// registry untouched.
    pub async fn on_subscribe(&self, connection_id: &str, user_identity: &str) -> AppResult<BindOutcome> {
        let mut outcome = BindOutcome::default();

        if is_placeholder(user_identity) {
            warn!(
                connection_id = %connection_id,
                user_identity = %user_identity,
                "Subscribe to placeholder identity ignored"
            );
            return Ok(outcome);
        }

        for record in self.registry.find_active_by_user(user_identity).await? {
            // Re-subscribing on the same connection keeps its own record.
            if record.connection_id == connection_id {
                continue;
            }
            if self.registry.retire(&record).await? {
                info!(
                    user_identity = %user_identity,
                    connection_id = %record.connection_id,
                    record_id = record.id,
                    "Superseded previous session"
                );
                outcome.superseded.push(record);
            }
        }

        let Some(record) = self.registry.find_active_by_connection(connection_id).await? else {
            debug!(
                connection_id = %connection_id,
                user_identity = %user_identity,
                "Subscribe for connection without active record, ignored"
            );
            return Ok(outcome);
        };

        if self.registry.rebind(&record, user_identity).await? {
            info!(
                connection_id = %connection_id,
                user_identity = %user_identity,
                record_id = record.id,
                "Connection bound to user"
            );
            outcome.bound = Some(ConnectionRecord {
                user_identity: user_identity.to_string(),
                ..record
            });
        } else {
            debug!(
                connection_id = %connection_id,
                record_id = record.id,
                "Record retired before bind, ignored"
            );
        }

        Ok(outcome)
    }

    /// Retire the connection's active record. Returns `false` when there
    /// was none.
    pub async fn on_disconnect(&self, connection_id: &str) -> AppResult<bool> {
        let Some(record) = self.registry.find_active_by_connection(connection_id).await? else {
            debug!(connection_id = %connection_id, "Disconnect for connection without active record");
            return Ok(false);
        };

        let retired = self.registry.retire(&record).await?;
        if retired {
            info!(
                connection_id = %connection_id,
                user_identity = %record.user_identity,
                record_id = record.id,
                "Connection retired"
            );
        }
        Ok(retired)
    }

    /// Active records bound to a user, newest first.
    pub async fn active_sessions(&self, user_identity: &str) -> AppResult<Vec<ConnectionRecord>> {
        self.registry.find_active_by_user(user_identity).await
    }

    /// Whether a user has at least one active record.
    pub async fn is_reachable(&self, user_identity: &str) -> AppResult<bool> {
        Ok(!self.active_sessions(user_identity).await?.is_empty())
    }

    /// The active record for a connection, if any.
    pub async fn connection(&self, connection_id: &str) -> AppResult<Option<ConnectionRecord>> {
        self.registry.find_active_by_connection(connection_id).await
    }

    /// Any record by ID, active or retired.
    pub async fn record(&self, record_id: i64) -> AppResult<Option<ConnectionRecord>> {
        self.registry.find_by_id(record_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyhub_database::memory::MemorySessionRegistry;
    use notifyhub_entity::connection::ConnectionState;

    fn tracker(policy: DuplicateConnectionPolicy) -> PresenceTracker {
        PresenceTracker::new(Arc::new(MemorySessionRegistry::new()), policy)
    }

    #[tokio::test]
    async fn test_connect_creates_placeholder_record() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let id = tracker.on_connect("s1").await.unwrap().unwrap();

        let record = tracker.connection("s1").await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.user_identity, "TEMP_s1");
        assert!(record.is_active);
        assert_eq!(record.state(), ConnectionState::ConnectedUnbound);
    }

    #[tokio::test]
    async fn test_duplicate_connect_policies() {
        let ignoring = tracker(DuplicateConnectionPolicy::Ignore);
        ignoring.on_connect("s1").await.unwrap();
        assert_eq!(ignoring.on_connect("s1").await.unwrap(), None);

        let rejecting = tracker(DuplicateConnectionPolicy::Reject);
        rejecting.on_connect("s1").await.unwrap();
        let err = rejecting.on_connect("s1").await.unwrap_err();
        assert!(err.is_duplicate_connection());
    }

    #[tokio::test]
    async fn test_subscribe_binds_connection() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        tracker.on_connect("s1").await.unwrap();

        let outcome = tracker.on_subscribe("s1", "alice").await.unwrap();
        assert!(outcome.superseded.is_empty());
        let bound = outcome.bound.unwrap();
        assert_eq!(bound.user_identity, "alice");
        assert_eq!(bound.state(), ConnectionState::Bound);

        let sessions = tracker.active_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].connection_id, "s1");
    }

    #[tokio::test]
    async fn test_new_binding_supersedes_previous() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let first = tracker.on_connect("s1").await.unwrap().unwrap();
        tracker.on_subscribe("s1", "alice").await.unwrap();
        tracker.on_connect("s2").await.unwrap();

        let outcome = tracker.on_subscribe("s2", "alice").await.unwrap();
        assert_eq!(outcome.superseded.len(), 1);
        assert_eq!(outcome.superseded[0].connection_id, "s1");

        let sessions = tracker.active_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].connection_id, "s2");

        let retired = tracker.record(first).await.unwrap().unwrap();
        assert!(!retired.is_active);
        assert!(retired.disconnected_at.is_some());
        assert!(tracker.connection("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_binding_leaves_other_users_alone() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        tracker.on_connect("s1").await.unwrap();
        tracker.on_subscribe("s1", "alice").await.unwrap();
        tracker.on_connect("s2").await.unwrap();
        tracker.on_subscribe("s2", "bob").await.unwrap();

        assert!(tracker.is_reachable("alice").await.unwrap());
        assert!(tracker.is_reachable("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_rebind_to_different_user() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        tracker.on_connect("s1").await.unwrap();
        tracker.on_subscribe("s1", "alice").await.unwrap();
        tracker.on_subscribe("s1", "bob").await.unwrap();

        assert!(!tracker.is_reachable("alice").await.unwrap());
        let sessions = tracker.active_sessions("bob").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].connection_id, "s1");
    }

    #[tokio::test]
    async fn test_repeated_subscribe_is_idempotent() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let id = tracker.on_connect("s1").await.unwrap().unwrap();
        tracker.on_subscribe("s1", "alice").await.unwrap();

        let outcome = tracker.on_subscribe("s1", "alice").await.unwrap();
        assert!(outcome.superseded.is_empty());

        let sessions = tracker.active_sessions("alice").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert!(sessions[0].is_active);
    }

    #[tokio::test]
    async fn test_placeholder_identity_is_never_bound() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let victim = tracker.on_connect("s2").await.unwrap().unwrap();
        tracker.on_connect("s1").await.unwrap();

        let outcome = tracker.on_subscribe("s1", "TEMP_s2").await.unwrap();
        assert_eq!(outcome, BindOutcome::default());

        let untouched = tracker.record(victim).await.unwrap().unwrap();
        assert!(untouched.is_active);
        assert_eq!(untouched.state(), ConnectionState::ConnectedUnbound);

        let s1 = tracker.connection("s1").await.unwrap().unwrap();
        assert_eq!(s1.user_identity, "TEMP_s1");
    }

    #[tokio::test]
    async fn test_dangling_subscribe_is_noop() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let outcome = tracker.on_subscribe("ghost", "alice").await.unwrap();
        assert_eq!(outcome, BindOutcome::default());
        assert!(!tracker.is_reachable("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_disconnect_retires_and_repeats_as_noop() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let id = tracker.on_connect("s1").await.unwrap().unwrap();
        tracker.on_subscribe("s1", "alice").await.unwrap();

        assert!(tracker.on_disconnect("s1").await.unwrap());
        let retired = tracker.record(id).await.unwrap().unwrap();
        assert_eq!(retired.state(), ConnectionState::Retired);

        assert!(!tracker.on_disconnect("s1").await.unwrap());
        assert_eq!(tracker.record(id).await.unwrap().unwrap(), retired);
        assert!(!tracker.is_reachable("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_disconnect_without_subscribe() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        tracker.on_connect("s1").await.unwrap();
        assert!(tracker.on_disconnect("s1").await.unwrap());
        assert!(tracker.connection("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_after_disconnect_does_not_resurrect() {
        let tracker = tracker(DuplicateConnectionPolicy::Ignore);
        let id = tracker.on_connect("s1").await.unwrap().unwrap();
        tracker.on_disconnect("s1").await.unwrap();

        let outcome = tracker.on_subscribe("s1", "alice").await.unwrap();
        assert!(outcome.bound.is_none());
        let record = tracker.record(id).await.unwrap().unwrap();
        assert!(!record.is_active);
        assert_eq!(record.user_identity, "TEMP_s1");
    }
}
