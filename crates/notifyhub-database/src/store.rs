//! Store traits shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;

use notifyhub_core::result::AppResult;
use notifyhub_entity::connection::ConnectionRecord;
use notifyhub_entity::notification::{CreateNotification, Notification};

/// Persisted table of connection records.
///
/// Every operation is atomic with respect to the underlying store.
/// `retire` and `rebind` on the same record are mutually exclusive, and
/// neither ever touches a record that is already retired.
#[async_trait]
pub trait SessionRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new active record carrying the placeholder identity for
    /// `connection_id`. Fails with `DuplicateConnection` if an active
    /// record already holds that connection id.
    async fn create(&self, connection_id: &str) -> AppResult<i64>;

    /// Active records bound to `user_identity`, newest first.
    async fn find_active_by_user(&self, user_identity: &str) -> AppResult<Vec<ConnectionRecord>>;

    /// The active record holding `connection_id`, if any.
    async fn find_active_by_connection(
        &self,
        connection_id: &str,
    ) -> AppResult<Option<ConnectionRecord>>;

    /// Any record by surrogate id, active or retired.
    async fn find_by_id(&self, record_id: i64) -> AppResult<Option<ConnectionRecord>>;

    /// Retire an active record. Returns `false` if it was already retired.
    async fn retire(&self, record: &ConnectionRecord) -> AppResult<bool>;

    /// Rebind an active record to `user_identity` in place. Returns
    /// `false` if the record was retired in the meantime.
    async fn rebind(&self, record: &ConnectionRecord, user_identity: &str) -> AppResult<bool>;
}

/// Persisted notification records keyed by receiver identity.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new unread notification.
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification>;

    /// Find a notification by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Notification>>;

    /// All notifications for a receiver, newest first.
    async fn find_by_receiver(&self, receiver_id: &str) -> AppResult<Vec<Notification>>;

    /// Unread notifications for a receiver, newest first.
    async fn find_unread_by_receiver(&self, receiver_id: &str) -> AppResult<Vec<Notification>>;

    /// Mark one notification read. Returns `false` if the id is unknown.
    async fn mark_read(&self, id: i64) -> AppResult<bool>;

    /// Mark every unread notification of a receiver read.
    async fn mark_all_read(&self, receiver_id: &str) -> AppResult<u64>;

    /// Count unread notifications for a receiver.
    async fn count_unread(&self, receiver_id: &str) -> AppResult<i64>;
}
