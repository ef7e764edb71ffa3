//! Notification handlers.

use axum::Json;
use axum::extract::{Path, State};

use notifyhub_service::NotificationResponse;

use crate::dto::request::SendNotificationRequest;
use crate::dto::response::{ApiResponse, CountResponse, MarkAllReadResponse, MarkReadResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/notifications/send
pub async fn send_notification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendNotificationRequest>,
) -> Result<Json<ApiResponse<NotificationResponse>>, ApiError> {
    let response = state.notification_service.send_notification(req.into()).await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/notifications/user/{receiver_id}
pub async fn list_for_receiver(
    State(state): State<AppState>,
    Path(receiver_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    let notifications = state.notification_service.list_for_receiver(&receiver_id).await?;
    Ok(Json(ApiResponse::ok(notifications)))
}

/// GET /api/notifications/user/{receiver_id}/unread
pub async fn list_unread(
    State(state): State<AppState>,
    Path(receiver_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    let notifications = state.notification_service.list_unread(&receiver_id).await?;
    Ok(Json(ApiResponse::ok(notifications)))
}

/// GET /api/notifications/user/{receiver_id}/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Path(receiver_id): Path<String>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&receiver_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MarkReadResponse>>, ApiError> {
    let updated = state.notification_service.mark_read(id).await?;
    Ok(Json(ApiResponse::ok(MarkReadResponse { updated })))
}

/// PUT /api/notifications/user/{receiver_id}/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(receiver_id): Path<String>,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>, ApiError> {
    let marked = state.notification_service.mark_all_read(&receiver_id).await?;
    Ok(Json(ApiResponse::ok(MarkAllReadResponse { marked })))
}
