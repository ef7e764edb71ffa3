//! Health check handler.

use axum::Json;
use axum::extract::State;

use notifyhub_core::config::StoreBackend;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (store, database) = match (&state.db_pool, state.config.database.backend) {
        (Some(pool), _) => {
            let db = if pool.is_reachable().await {
                "connected"
            } else {
                "unavailable"
            };
            ("postgres", db)
        }
        (None, StoreBackend::Memory) => ("memory", "n/a"),
        (None, StoreBackend::Postgres) => ("postgres", "unavailable"),
    };

    let status = if database == "unavailable" { "degraded" } else { "ok" };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: store.to_string(),
        database: database.to_string(),
        ws_connections: state.realtime.broker.connection_count(),
    }))
}
