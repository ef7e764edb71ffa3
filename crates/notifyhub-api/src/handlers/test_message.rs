//! Test message handler.

use axum::Json;
use axum::extract::{Path, State};

use notifyhub_service::TestMessageResult;

use crate::dto::request::TestMessageRequest;
use crate::state::AppState;

/// POST /api/websocket-test/send-test-message/{user_id}
///
/// Always answers 200; the outcome is carried in `status`.
pub async fn send_test_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Option<Json<TestMessageRequest>>,
) -> Json<TestMessageResult> {
    let message = body.and_then(|Json(req)| req.message);
    Json(
        state
            .test_message_service
            .send_test_message(&user_id, message)
            .await,
    )
}
