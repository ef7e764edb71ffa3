//! HTTP API tests against the in-memory backend.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, drain, message_bodies};

fn send_body(receiver: &str, message: &str) -> serde_json::Value {
    json!({
        "senderId": "system",
        "receiverId": receiver,
        "message": message,
        "type": "INFO"
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    assert_eq!(body["data"]["wsConnections"], 0);
}

#[tokio::test]
async fn test_send_to_offline_user_is_stored() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/notifications/send", send_body("bob", "hello"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["receiverId"], "bob");
    assert_eq!(body["data"]["isRead"], false);
    let id = body["data"]["id"].as_i64().expect("numeric id");

    let (_, list) = app.get("/api/notifications/user/bob").await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

    let (_, count) = app.get("/api/notifications/user/bob/unread-count").await;
    assert_eq!(count["data"]["count"], 1);

    let (status, marked) = app.put(&format!("/api/notifications/{id}/read")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["data"]["updated"], true);

    let (_, unread) = app.get("/api/notifications/user/bob/unread").await;
    assert_eq!(unread["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_mark_unknown_notification_is_noop() {
    let app = TestApp::new();
    let (status, body) = app.put("/api/notifications/4242/read").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], false);
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = TestApp::new();
    app.post("/api/notifications/send", send_body("carol", "one")).await;
    app.post("/api/notifications/send", send_body("carol", "two")).await;

    let (status, body) = app.put("/api/notifications/user/carol/read-all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["marked"], 2);

    let (_, count) = app.get("/api/notifications/user/carol/unread-count").await;
    assert_eq!(count["data"]["count"], 0);
}

#[tokio::test]
async fn test_send_rejects_invalid_body() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/notifications/send", send_body("", "hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = app
        .post("/api/notifications/send", json!({"receiverId": "bob"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_to_connected_user_is_pushed() {
    let app = TestApp::new();
    let mut rx = app.connect_user("s1", "alice").await;

    let (status, body) = app
        .post("/api/notifications/send", send_body("alice", "hi"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let pushed = message_bodies(&drain(&mut rx));
    assert_eq!(pushed, vec![body["data"].clone()]);
}

#[tokio::test]
async fn test_presence_follows_connection_lifecycle() {
    let app = TestApp::new();

    let (_, before) = app.get("/api/presence/alice").await;
    assert_eq!(before["data"]["reachable"], false);

    let _rx1 = app.connect_user("s1", "alice").await;
    let _rx2 = app.connect_user("s2", "alice").await;

    let (status, during) = app.get("/api/presence/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(during["data"]["reachable"], true);
    let sessions = during["data"]["sessions"].as_array().expect("sessions array");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["connectionId"], "s2");
    assert!(sessions[0]["recordId"].is_i64());

    app.engine.disconnect("s2").await;
    let (_, after) = app.get("/api/presence/alice").await;
    assert_eq!(after["data"]["reachable"], false);
}

#[tokio::test]
async fn test_send_test_message() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/websocket-test/send-test-message/dave",
            json!({"message": "ping"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");

    let mut rx = app.connect_user("s1", "dave").await;
    let (_, body) = app
        .post(
            "/api/websocket-test/send-test-message/dave",
            json!({"message": "ping"}),
        )
        .await;
    assert_eq!(body["status"], "success");

    let pushed = message_bodies(&drain(&mut rx));
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0]["id"], 999);
    assert_eq!(pushed[0]["type"], "TEST");
    assert_eq!(pushed[0]["message"], "ping");
}
