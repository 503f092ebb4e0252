//! Gateway end-to-end tests
//!
//! Each test spawns a gateway on an ephemeral port with the in-memory
//! store, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use chrono::DateTime;
use integration_tests::{eventually, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

// ============================================================================
// Chat Flow Tests
// ============================================================================

#[tokio::test]
async fn test_two_users_chat() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.connect().await.unwrap();
    let mut bob = server.connect().await.unwrap();

    alice.join("Alice").await.unwrap();
    let welcome = alice.expect("welcome").await.unwrap();
    assert_eq!(welcome["history"], json!([]));
    let alice_id = welcome["userId"].clone();
    assert!(alice_id.is_string());

    bob.join("Bob").await.unwrap();
    let welcome = bob.expect("welcome").await.unwrap();
    assert_eq!(welcome["history"][0]["content"], "Alice joined");
    assert_eq!(welcome["history"][0]["type"], "SYSTEM");
    assert_eq!(welcome["history"][0]["userId"], Value::Null);

    let joined = alice.expect("user-joined").await.unwrap();
    assert_eq!(joined["user"]["name"], "Bob");
    assert_eq!(joined["user"]["isOnline"], true);
    assert_eq!(joined["systemMessage"]["content"], "Bob joined");

    let health: Value = server.get("/health").await.unwrap().json().await.unwrap();
    assert_eq!(health["connections"], 2);

    alice.say("hi bob").await.unwrap();
    for client in [&mut alice, &mut bob] {
        let frame = client.expect("message").await.unwrap();
        assert_eq!(frame["message"]["content"], "hi bob");
        assert_eq!(frame["message"]["userName"], "Alice");
        assert_eq!(frame["message"]["userId"], alice_id);
        assert_eq!(frame["message"]["type"], "USER");
    }

    bob.close().await.unwrap();
    let left = alice.expect("user-left").await.unwrap();
    assert_eq!(left["systemMessage"]["content"], "Bob left");

    let state = server.state().clone();
    assert!(eventually(|| state.registry().count() == 1).await);
}

#[tokio::test]
async fn test_error_frames_keep_connection_open() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.connect().await.unwrap();

    client.say("anyone?").await.unwrap();
    let error = client.expect("error").await.unwrap();
    assert_eq!(error["code"], "NOT_JOINED");

    client.send_binary(vec![1, 2, 3]).await.unwrap();
    let error = client.expect("error").await.unwrap();
    assert_eq!(error["code"], "INTERNAL_ERROR");

    client.send_json(&json!({"type": "typing"})).await.unwrap();
    let error = client.expect("error").await.unwrap();
    assert_eq!(error["code"], "INTERNAL_ERROR");

    client.join("").await.unwrap();
    let error = client.expect("error").await.unwrap();
    assert_eq!(error["code"], "INVALID_NAME");

    client.join("Trent").await.unwrap();
    client.expect("welcome").await.unwrap();
}

#[tokio::test]
async fn test_keepalive_ping() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.connect().await.unwrap();
    client.recv_ping().await.unwrap();
}

// ============================================================================
// Shutdown Tests
// ============================================================================

#[tokio::test]
async fn test_graceful_shutdown_closes_connections() {
    let server = TestServer::start().await.expect("Failed to start server");
    let state = server.state().clone();

    let mut alice = server.connect().await.unwrap();
    alice.join("Alice").await.unwrap();
    alice.expect("welcome").await.unwrap();
    assert!(state.rate_limiter().is_running());

    server.shutdown().await.unwrap();

    let frame = alice.recv_close().await.unwrap().expect("close frame");
    assert_eq!(u16::from(frame.code), 1001);
    assert!(state.registry().is_empty());
    assert!(!state.rate_limiter().is_running());
}
