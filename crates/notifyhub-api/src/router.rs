//! Route definitions for the NotifyHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the router and thread `AppState` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(test_message_routes())
        .merge(presence_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Notification CRUD and send
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/send", post(handlers::notification::send_notification))
        .route(
            "/notifications/user/{receiver_id}",
            get(handlers::notification::list_for_receiver),
        )
        .route(
            "/notifications/user/{receiver_id}/unread",
            get(handlers::notification::list_unread),
        )
        .route(
            "/notifications/user/{receiver_id}/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/user/{receiver_id}/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route("/notifications/{id}/read", put(handlers::notification::mark_read))
}

/// Unpersisted test pushes
fn test_message_routes() -> Router<AppState> {
    Router::new().route(
        "/websocket-test/send-test-message/{user_id}",
        post(handlers::test_message::send_test_message),
    )
}

/// Presence observability
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence/{user_id}", get(handlers::presence::get_presence))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
