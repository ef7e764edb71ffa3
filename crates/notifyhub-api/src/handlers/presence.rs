//! Presence handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::{ApiResponse, PresenceResponse, SessionResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/presence/{user_id}
pub async fn get_presence(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PresenceResponse>>, ApiError> {
    let sessions = state.realtime.presence.active_sessions(&user_id).await?;
    Ok(Json(ApiResponse::ok(PresenceResponse {
        user_id,
        reachable: !sessions.is_empty(),
        sessions: sessions.into_iter().map(SessionResponse::from).collect(),
    })))
}
