//! PostgreSQL-backed session registry.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use notifyhub_core::error::{AppError, ErrorKind};
use notifyhub_core::result::AppResult;
use notifyhub_entity::connection::{ConnectionRecord, placeholder_identity};

use crate::store::SessionRegistry;

/// Registry over the `connection_sessions` table.
///
/// Each mutation runs in its own transaction. `retire` and `rebind` take a
/// row lock first so the two never interleave on the same record.
#[derive(Debug, Clone)]
pub struct PgSessionRegistry {
    pool: PgPool,
}

impl PgSessionRegistry {
    /// Create a new registry over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRegistry for PgSessionRegistry {
    async fn create(&self, connection_id: &str) -> AppResult<i64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO connection_sessions (user_identity, connection_id, connected_at, is_active) \
             VALUES ($1, $2, NOW(), TRUE) \
             ON CONFLICT (connection_id) WHERE is_active DO NOTHING \
             RETURNING id",
        )
        .bind(placeholder_identity(connection_id))
        .bind(connection_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create connection record", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit connection record", e)
        })?;

        id.ok_or_else(|| AppError::duplicate_connection(connection_id))
    }

    async fn find_active_by_user(&self, user_identity: &str) -> AppResult<Vec<ConnectionRecord>> {
        sqlx::query_as::<_, ConnectionRecord>(
            "SELECT * FROM connection_sessions WHERE user_identity = $1 AND is_active = TRUE \
             ORDER BY connected_at DESC, id DESC",
        )
        .bind(user_identity)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active records by user", e)
        })
    }

    async fn find_active_by_connection(
        &self,
        connection_id: &str,
    ) -> AppResult<Option<ConnectionRecord>> {
        sqlx::query_as::<_, ConnectionRecord>(
            "SELECT * FROM connection_sessions WHERE connection_id = $1 AND is_active = TRUE",
        )
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find active record by connection",
                e,
            )
        })
    }

    async fn find_by_id(&self, record_id: i64) -> AppResult<Option<ConnectionRecord>> {
        sqlx::query_as::<_, ConnectionRecord>("SELECT * FROM connection_sessions WHERE id = $1")
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find connection record", e)
            })
    }

    async fn retire(&self, record: &ConnectionRecord) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM connection_sessions WHERE id = $1 FOR UPDATE")
                .bind(record.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock connection record", e)
                })?;

        if active != Some(true) {
            debug!(record_id = record.id, "Record already retired");
            return Ok(false);
        }

        sqlx::query(
            "UPDATE connection_sessions SET is_active = FALSE, disconnected_at = NOW() WHERE id = $1",
        )
        .bind(record.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to retire connection record", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit retirement", e)
        })?;

        Ok(true)
    }

    async fn rebind(&self, record: &ConnectionRecord, user_identity: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM connection_sessions WHERE id = $1 FOR UPDATE")
                .bind(record.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock connection record", e)
                })?;

        if active != Some(true) {
            debug!(record_id = record.id, "Refusing to rebind a retired record");
            return Ok(false);
        }

        sqlx::query("UPDATE connection_sessions SET user_identity = $2 WHERE id = $1")
            .bind(record.id)
            .bind(user_identity)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to rebind connection record", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit rebind", e)
        })?;

        Ok(true)
    }
}
