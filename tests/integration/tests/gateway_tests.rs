//! Gateway Integration Tests
//!
//! Boots the real axum gateway on an ephemeral port with in-memory
//! collaborators and drives it over WebSockets.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use chat_cache::PresenceStatus;
use chat_common::{FanoutStrategy, OfflinePolicy};
use chat_core::{ConversationId, UserId};
use chat_gateway::connection::Connection;
use chat_gateway::handlers::HandshakeHandler;
use chat_service::Identity;
use integration_tests::{eventually, TestGateway, TestWorld, WsClient, QUIET_PERIOD};
use serde_json::json;
use std::time::Duration;

fn identity(user: &str, name: &str) -> Identity {
    Identity {
        user_id: UserId::from(user),
        email: format!("{user}@example.com"),
        name: name.to_string(),
        avatar: None,
    }
}

fn world() -> TestWorld {
    let world = TestWorld::new();
    world.add_user("a", "alice");
    world.add_user("b", "bob");
    world.add_user("x", "mallory");
    world.add_conversation("c", &["a", "b"]);
    world
}

// ============================================================================
// Health Check
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let gateway = TestGateway::start(world()).await.unwrap();

    let response = gateway
        .client
        .get(format!("{}/health", gateway.base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_handshake_announces_user() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();

    let (_a, connected) = gateway.connect_as("a").await.unwrap();
    assert_eq!(connected["userId"], "a");
    assert!(connected["connectionId"].as_str().is_some_and(|id| !id.is_empty()));
    let online = connected["onlineUserIds"].as_array().unwrap();
    assert!(online.contains(&json!("a")));
    assert!(online.contains(&json!("b")));

    let announced = loop {
        let event = b.expect_event("user:online").await.unwrap();
        if event["userId"] == "a" {
            break event;
        }
    };
    assert_eq!(announced, json!({"userId": "a", "name": "alice", "status": "online"}));

    let status = gateway.presence().get_status(&UserId::from("a")).await.unwrap();
    assert_eq!(status, Some(PresenceStatus::Online));
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    client.handshake(Some("not-a-jwt")).await.unwrap();
    let (code, frames) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4004));
    assert_eq!(frames[0]["event"], "error");
    assert_eq!(frames[0]["data"]["code"], "AUTH_ERROR");
    assert_eq!(gateway.state.connection_manager().connection_count(), 0);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    client
        .handshake(Some(&gateway.expired_token_for("a")))
        .await
        .unwrap();
    let (code, _) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4004));
    assert!(!gateway.presence().is_online(&UserId::from("a")).await.unwrap());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    client.handshake(None).await.unwrap();
    let (code, frames) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4004));
    assert_eq!(frames[0]["data"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_deleted_user_is_rejected() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    client
        .handshake(Some(&gateway.token_for("ghost")))
        .await
        .unwrap();
    let (code, _) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4004));
    assert!(gateway
        .presence()
        .get_online_user_ids()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_first_frame_must_be_handshake() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    client
        .emit("conversation:join", json!({"conversationId": "c"}), Some(1))
        .await
        .unwrap();
    let (code, frames) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4003));
    assert_eq!(frames[0]["data"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_handshake_timeout() {
    let gateway = TestGateway::start_with(world(), |config| {
        config.handshake_timeout_ms = 150;
    })
    .await
    .unwrap();
    let mut client = WsClient::connect(&gateway.ws_url()).await.unwrap();

    let (code, frames) = client.expect_close().await.unwrap();

    assert_eq!(code, Some(4009));
    assert_eq!(frames[0]["data"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_token_from_query_parameter() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let url = format!("{}?token={}", gateway.ws_url(), gateway.token_for("a"));
    let mut client = WsClient::connect(&url).await.unwrap();

    client.handshake(None).await.unwrap();
    let connected = client.expect_event("connected").await.unwrap();

    assert_eq!(connected["userId"], "a");
}

#[tokio::test]
async fn test_token_from_bearer_header() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let mut client = WsClient::connect_with_bearer(&gateway.ws_url(), &gateway.token_for("b"))
        .await
        .unwrap();

    client.handshake(None).await.unwrap();
    let connected = client.expect_event("connected").await.unwrap();

    assert_eq!(connected["userId"], "b");
}

#[tokio::test]
async fn test_handshake_token_wins_over_query() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let url = format!("{}?token=garbage", gateway.ws_url());
    let mut client = WsClient::connect(&url).await.unwrap();

    client.handshake(Some(&gateway.token_for("a"))).await.unwrap();
    let connected = client.expect_event("connected").await.unwrap();

    assert_eq!(connected["userId"], "a");
}

#[tokio::test]
async fn test_second_handshake_is_bad_request() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();

    let error = a
        .request_error("handshake", json!({"auth": {"token": gateway.token_for("b")}}), 1)
        .await
        .unwrap();
    assert_eq!(error["code"], "BAD_REQUEST");

    // Identity is unchanged
    let ack = a
        .request("conversation:join", json!({"conversationId": "c"}), 2)
        .await
        .unwrap();
    assert_eq!(ack["success"], true);
}

// ============================================================================
// Frames
// ============================================================================

#[tokio::test]
async fn test_bad_frames_keep_connection_open() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();

    a.send_text("{not json").await.unwrap();
    assert_eq!(a.expect_event("error").await.unwrap()["code"], "BAD_REQUEST");

    let unknown = a.request_error("conversation:delete", json!({}), 1).await.unwrap();
    assert_eq!(unknown["code"], "UNKNOWN_EVENT");

    let missing_field = a.request_error("conversation:join", json!({}), 2).await.unwrap();
    assert_eq!(missing_field["code"], "BAD_REQUEST");

    let unsafe_id = a
        .request_error("conversation:join", json!({"conversationId": "c:1"}), 3)
        .await
        .unwrap();
    assert_eq!(unsafe_id["code"], "BAD_REQUEST");

    let ack = a
        .request("conversation:join", json!({"conversationId": "c"}), 4)
        .await
        .unwrap();
    assert_eq!(ack, json!({"id": 4, "success": true, "conversationId": "c"}));
}

// ============================================================================
// Conversations
// ============================================================================

#[tokio::test]
async fn test_non_participant_cannot_join() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut x, _) = gateway.connect_as("x").await.unwrap();

    let error = x
        .request_error("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    assert_eq!(error["code"], "FORBIDDEN");
    assert!(gateway
        .state
        .connection_manager()
        .get_group_connections(&ConversationId::from("c"))
        .is_empty());
}

#[tokio::test]
async fn test_non_participant_never_receives_messages() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut x, _) = gateway.connect_as("x").await.unwrap();

    let _ = x
        .request_error("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    a.request("message:send", json!({"conversationId": "c", "content": "secret"}), 2)
        .await
        .unwrap();

    assert_eq!(x.count_events("message:received", QUIET_PERIOD).await, 0);
}

// ============================================================================
// Fan-out
// ============================================================================

async fn assert_four_device_fanout(strategy: FanoutStrategy) {
    let gateway = TestGateway::start_with(world(), |config| {
        config.fanout_strategy = strategy;
    })
    .await
    .unwrap();

    let (mut a1, _) = gateway.connect_as("a").await.unwrap();
    let (mut a2, _) = gateway.connect_as("a").await.unwrap();
    let (mut b1, _) = gateway.connect_as("b").await.unwrap();
    let (mut b2, _) = gateway.connect_as("b").await.unwrap();

    a1.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    b2.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    let ack = a1
        .request("message:send", json!({"conversationId": "c", "content": "hi"}), 2)
        .await
        .unwrap();
    assert_eq!(ack["message"]["content"], "hi");
    assert_eq!(ack["message"]["sender"]["id"], "a");

    for client in [&mut a1, &mut a2, &mut b1, &mut b2] {
        let received = client.expect_event("message:received").await.unwrap();
        assert_eq!(received["content"], "hi");
        assert_eq!(received["conversationId"], "c");
        assert_eq!(received["sender"]["name"], "alice");
        assert_eq!(client.count_events("message:received", QUIET_PERIOD).await, 0);
    }

    assert_eq!(gateway.world.stored_messages().len(), 1);
}

#[tokio::test]
async fn test_fanout_reaches_every_device_once() {
    assert_four_device_fanout(FanoutStrategy::Indexed).await;
}

#[tokio::test]
async fn test_full_scan_fanout_reaches_every_device_once() {
    assert_four_device_fanout(FanoutStrategy::FullScan).await;
}

#[tokio::test]
async fn test_persistence_failure_delivers_nothing() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    b.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    gateway.world.fail_message_writes(true);
    let error = a
        .request_error("message:send", json!({"conversationId": "c", "content": "hi"}), 2)
        .await
        .unwrap();

    assert_eq!(error["code"], "INTERNAL_ERROR");
    assert_eq!(error["message"], "Internal server error");
    assert_eq!(b.count_events("message:received", QUIET_PERIOD).await, 0);
}

#[tokio::test]
async fn test_message_from_departing_sender_is_still_delivered() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    b.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    // No ack requested, and the socket goes away right after the frame
    a.emit("message:send", json!({"conversationId": "c", "content": "bye"}), None)
        .await
        .unwrap();
    a.close().await.unwrap();

    let received = b.expect_event("message:received").await.unwrap();
    assert_eq!(received["content"], "bye");
    assert_eq!(received["sender"]["id"], "a");
    assert_eq!(b.count_events("message:received", QUIET_PERIOD).await, 0);
    assert_eq!(gateway.world.stored_messages().len(), 1);
}

#[tokio::test]
async fn test_send_validation() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut x, _) = gateway.connect_as("x").await.unwrap();

    let missing = a
        .request_error("message:send", json!({"conversationId": "nope", "content": "hi"}), 1)
        .await
        .unwrap();
    assert_eq!(missing["code"], "NOT_FOUND");

    let outsider = x
        .request_error("message:send", json!({"conversationId": "c", "content": "hi"}), 1)
        .await
        .unwrap();
    assert_eq!(outsider["code"], "FORBIDDEN");

    let blank = a
        .request_error("message:send", json!({"conversationId": "c", "content": "  "}), 2)
        .await
        .unwrap();
    assert_eq!(blank["code"], "VALIDATION_ERROR");

    let too_long = a
        .request_error(
            "message:send",
            json!({"conversationId": "c", "content": "x".repeat(2001)}),
            3,
        )
        .await
        .unwrap();
    assert_eq!(too_long["code"], "VALIDATION_ERROR");

    assert!(gateway.world.stored_messages().is_empty());
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test]
async fn test_typing_reaches_group_except_typist() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a1, _) = gateway.connect_as("a").await.unwrap();
    let (mut a2, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    for client in [&mut a1, &mut a2, &mut b] {
        client
            .request("conversation:join", json!({"conversationId": "c"}), 1)
            .await
            .unwrap();
    }

    let ack = a1
        .request("typing:start", json!({"conversationId": "c"}), 2)
        .await
        .unwrap();
    assert_eq!(ack["isTyping"], true);

    let update = b.expect_event("typing:update").await.unwrap();
    assert_eq!(update, json!({"conversationId": "c", "userId": "a", "isTyping": true}));
    assert_eq!(a2.count_events("typing:update", QUIET_PERIOD).await, 0);

    let typing = gateway
        .presence()
        .get_typing_users(&ConversationId::from("c"))
        .await
        .unwrap();
    assert_eq!(typing, vec![UserId::from("a")]);

    a1.request("typing:stop", json!({"conversationId": "c"}), 3)
        .await
        .unwrap();
    let update = b.expect_event("typing:update").await.unwrap();
    assert_eq!(update["isTyping"], false);
}

#[tokio::test]
async fn test_typing_requires_participant() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut x, _) = gateway.connect_as("x").await.unwrap();

    let error = x
        .request_error("typing:start", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    assert_eq!(error["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_sending_ends_typing() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    b.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();

    a.request("typing:start", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    assert_eq!(b.expect_event("typing:update").await.unwrap()["isTyping"], true);

    a.request("message:send", json!({"conversationId": "c", "content": "done"}), 2)
        .await
        .unwrap();

    b.expect_event("message:received").await.unwrap();
    assert_eq!(b.expect_event("typing:update").await.unwrap()["isTyping"], false);
    assert!(gateway
        .presence()
        .get_typing_users(&ConversationId::from("c"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_leave_purges_typing_marker() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    a.request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    a.request("typing:start", json!({"conversationId": "c"}), 2)
        .await
        .unwrap();

    let ack = a
        .request("conversation:leave", json!({"conversationId": "c"}), 3)
        .await
        .unwrap();

    assert_eq!(ack["conversationId"], "c");
    assert!(gateway
        .presence()
        .get_typing_users(&ConversationId::from("c"))
        .await
        .unwrap()
        .is_empty());
    assert!(gateway
        .state
        .connection_manager()
        .get_group_connections(&ConversationId::from("c"))
        .is_empty());
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_status_update_is_broadcast_to_everyone() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut x, _) = gateway.connect_as("x").await.unwrap();

    let ack = a
        .request("presence:update", json!({"status": "busy"}), 1)
        .await
        .unwrap();
    assert_eq!(ack["status"], "busy");

    // x shares no conversation with a and still sees the change
    loop {
        let event = x.expect_event("user:online").await.unwrap();
        if event["userId"] == "a" && event["status"] == "busy" {
            break;
        }
    }

    let status = gateway.presence().get_status(&UserId::from("a")).await.unwrap();
    assert_eq!(status, Some(PresenceStatus::Busy));
}

#[tokio::test]
async fn test_invalid_status_is_bad_request() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();

    let error = a
        .request_error("presence:update", json!({"status": "invisible"}), 1)
        .await
        .unwrap();

    assert_eq!(error["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_disconnect_clears_presence_and_typing() {
    let world = world();
    world.add_conversation("d", &["a", "b"]);
    let gateway = TestGateway::start(world).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();

    a.request("typing:start", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    a.request("typing:start", json!({"conversationId": "d"}), 2)
        .await
        .unwrap();

    a.close().await.unwrap();

    let offline = b.expect_event("user:offline").await.unwrap();
    assert_eq!(offline, json!({"userId": "a"}));

    let presence = gateway.presence();
    assert!(eventually(|| async move {
        presence.get_status(&UserId::from("a")).await.unwrap().is_none()
    })
    .await);
    for conversation in ["c", "d"] {
        assert!(presence
            .get_typing_users(&ConversationId::from(conversation))
            .await
            .unwrap()
            .is_empty());
    }
    assert!(!presence
        .get_online_user_ids()
        .await
        .unwrap()
        .contains(&UserId::from("a")));
}

#[tokio::test]
async fn test_last_connection_policy_keeps_user_online() {
    let gateway = TestGateway::start_with(world(), |config| {
        config.offline_policy = OfflinePolicy::LastConnection;
    })
    .await
    .unwrap();
    let (a1, _) = gateway.connect_as("a").await.unwrap();
    let (a2, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    let manager = gateway.state.connection_manager();

    a1.close().await.unwrap();
    assert!(eventually(|| async move { manager.connection_count() == 2 }).await);
    assert_eq!(b.count_events("user:offline", QUIET_PERIOD).await, 0);
    assert!(gateway.presence().is_online(&UserId::from("a")).await.unwrap());

    a2.close().await.unwrap();
    assert_eq!(b.expect_event("user:offline").await.unwrap()["userId"], "a");
}

#[tokio::test]
async fn test_last_connection_close_spares_handshaking_connection() {
    let gateway = TestGateway::start_with(world(), |config| {
        config.offline_policy = OfflinePolicy::LastConnection;
    })
    .await
    .unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    let (a1, _) = gateway.connect_as("a").await.unwrap();
    let manager = gateway.state.connection_manager();

    // A second device for "a" is mid-handshake: indexed, not yet deliverable
    let (tx, _rx) = tokio::sync::mpsc::channel(8);
    let pending = Connection::new("pending-a".to_string(), identity("a", "alice"), tx);
    manager.reserve(&pending);

    a1.close().await.unwrap();
    assert!(eventually(|| async move { manager.connection_count() == 1 }).await);

    assert_eq!(b.count_events("user:offline", QUIET_PERIOD).await, 0);
    assert!(gateway.presence().is_online(&UserId::from("a")).await.unwrap());
    assert!(manager.has_user_connections(&UserId::from("a")));

    manager.release(&pending);
    assert!(!manager.has_user_connections(&UserId::from("a")));
}

#[tokio::test]
async fn test_failed_connected_delivery_leaves_no_presence() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    let manager = gateway.state.connection_manager();

    // The writer is already gone, so queuing `connected` fails
    let (tx, rx) = tokio::sync::mpsc::channel(8);
    drop(rx);
    let connection = Connection::new("doomed-a".to_string(), identity("a", "alice"), tx);

    assert!(HandshakeHandler::establish(&gateway.state, &connection)
        .await
        .is_err());

    assert!(!gateway.presence().is_online(&UserId::from("a")).await.unwrap());
    assert!(!gateway
        .presence()
        .get_online_user_ids()
        .await
        .unwrap()
        .contains(&UserId::from("a")));
    assert!(!manager.has_user_connections(&UserId::from("a")));
    assert_eq!(manager.connection_count(), 1);
    assert_eq!(b.count_events("user:online", QUIET_PERIOD).await, 0);
}

#[tokio::test]
async fn test_presence_store_failure_only_reaches_caller() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();
    for client in [&mut a, &mut b] {
        client
            .request("conversation:join", json!({"conversationId": "c"}), 1)
            .await
            .unwrap();
    }
    gateway.fail_presence_store(true);

    let error = a
        .request_error("typing:start", json!({"conversationId": "c"}), 2)
        .await
        .unwrap();
    assert_eq!(error["code"], "INTERNAL_ERROR");
    assert_eq!(error["message"], "Internal server error");
    assert_eq!(b.count_events("typing:update", QUIET_PERIOD).await, 0);

    let error = a
        .request_error("presence:update", json!({"status": "busy"}), 3)
        .await
        .unwrap();
    assert_eq!(error["code"], "INTERNAL_ERROR");
    assert_eq!(error["message"], "Internal server error");
    assert_eq!(b.count_events("user:online", QUIET_PERIOD).await, 0);

    gateway.fail_presence_store(false);

    // The failing requests left the connection open
    let ack = a
        .request("typing:start", json!({"conversationId": "c"}), 4)
        .await
        .unwrap();
    assert_eq!(ack["isTyping"], true);
    assert_eq!(b.expect_event("typing:update").await.unwrap()["userId"], "a");
}

#[tokio::test]
async fn test_per_connection_policy_marks_offline_on_any_close() {
    let gateway = TestGateway::start(world()).await.unwrap();
    let (a1, _) = gateway.connect_as("a").await.unwrap();
    let (_a2, _) = gateway.connect_as("a").await.unwrap();
    let (mut b, _) = gateway.connect_as("b").await.unwrap();

    a1.close().await.unwrap();

    assert_eq!(b.expect_event("user:offline").await.unwrap()["userId"], "a");
    assert!(!gateway.presence().is_online(&UserId::from("a")).await.unwrap());
}

// ============================================================================
// Keepalive
// ============================================================================

#[tokio::test]
async fn test_silent_connection_times_out() {
    let gateway = TestGateway::start_with(world(), |config| {
        config.heartbeat_interval_ms = 100;
        config.heartbeat_timeout_ms = 100;
    })
    .await
    .unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();

    // Not polling the socket leaves every ping unanswered
    tokio::time::sleep(Duration::from_millis(500)).await;

    let (code, _) = a.expect_close().await.unwrap();
    assert_eq!(code, Some(4009));

    let presence = gateway.presence();
    assert!(eventually(|| async move {
        !presence.is_online(&UserId::from("a")).await.unwrap()
    })
    .await);
    assert_eq!(gateway.state.connection_manager().connection_count(), 0);
}

#[tokio::test]
async fn test_answering_pings_keeps_connection_alive() {
    let gateway = TestGateway::start_with(world(), |config| {
        config.heartbeat_interval_ms = 100;
        config.heartbeat_timeout_ms = 100;
    })
    .await
    .unwrap();
    let (mut a, _) = gateway.connect_as("a").await.unwrap();

    // Reading drives the automatic pong replies
    assert_eq!(a.count_events("error", Duration::from_millis(600)).await, 0);

    let ack = a
        .request("conversation:join", json!({"conversationId": "c"}), 1)
        .await
        .unwrap();
    assert_eq!(ack["success"], true);
    assert!(gateway.presence().is_online(&UserId::from("a")).await.unwrap());
}
