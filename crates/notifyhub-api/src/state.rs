//! Application state shared across all handlers.

use std::sync::Arc;

use notifyhub_core::config::AppConfig;
use notifyhub_database::DatabasePool;
use notifyhub_realtime::RealtimeEngine;
use notifyhub_service::{NotificationService, TestMessageService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool; `None` on the memory backend
    pub db_pool: Option<Arc<DatabasePool>>,
    /// Real-time engine (presence, gate, broker)
    pub realtime: RealtimeEngine,
    /// Notification service
    pub notification_service: NotificationService,
    /// Test message service
    pub test_message_service: TestMessageService,
    /// Process start time
    pub started_at: std::time::Instant,
}

impl AppState {
    /// Assemble state from its parts.
    pub fn new(
        config: Arc<AppConfig>,
        db_pool: Option<Arc<DatabasePool>>,
        realtime: RealtimeEngine,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            config,
            db_pool,
            test_message_service: TestMessageService::new(realtime.clone()),
            realtime,
            notification_service,
            started_at: std::time::Instant::now(),
        }
    }
}
