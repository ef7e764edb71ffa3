//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use notifyhub_api::{AppState, build_app};
use notifyhub_core::config::{AppConfig, StoreBackend};
use notifyhub_database::{MemoryNotificationStore, MemorySessionRegistry};
use notifyhub_realtime::RealtimeEngine;
use notifyhub_realtime::message::types::{ClientFrame, ServerFrame};
use notifyhub_service::NotificationService;

/// Test application context on the in-memory backend.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The engine behind the router, for driving sockets directly
    pub engine: RealtimeEngine,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Memory;

        let engine = RealtimeEngine::new(
            config.realtime.clone(),
            Arc::new(MemorySessionRegistry::new()),
        );
        let notification_service =
            NotificationService::new(Arc::new(MemoryNotificationStore::new()), engine.clone());
        let state = AppState::new(Arc::new(config), None, engine.clone(), notification_service);

        Self {
            router: build_app(state),
            engine,
        }
    }

    /// Open a socket and subscribe it to a user's notification topic.
    pub async fn connect_user(&self, connection_id: &str, user: &str) -> mpsc::Receiver<ServerFrame> {
        let mut rx = self
            .engine
            .connect_with_id(connection_id)
            .await
            .expect("socket should connect");
        self.engine
            .handle_frame(
                connection_id,
                ClientFrame::Subscribe {
                    destination: self.engine.user_topic(user),
                },
            )
            .await;
        drain(&mut rx);
        rx
    }

    /// Send a request and return status plus parsed JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// GET helper
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    /// POST helper
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// PUT helper
    pub async fn put(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, None).await
    }
}

/// Collect every frame currently queued for a socket.
pub fn drain(rx: &mut mpsc::Receiver<ServerFrame>) -> Vec<ServerFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

/// Bodies of the `message` frames among `frames`.
pub fn message_bodies(frames: &[ServerFrame]) -> Vec<Value> {
    frames
        .iter()
        .filter_map(|f| match f {
            ServerFrame::Message { body, .. } => Some(body.clone()),
            _ => None,
        })
        .collect()
}
