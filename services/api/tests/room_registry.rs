//! Unit tests for `RoomRegistry`.
//!
//! These exercise the signaling relay's membership and delivery semantics
//! directly, without performing any HTTP upgrades: unicast targeting, join
//! broadcast scope, and room-scoped disconnect announcements. Delivery is
//! fire-and-forget, so the tests only ever assert on connected members of
//! the same room.

use axum::extract::ws::Message;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use api_lib::web::protocol::{RoomUser, ServerSignal};
use api_lib::web::rooms::RoomRegistry;

fn user(name: &str) -> RoomUser {
    RoomUser {
        user_id: Uuid::new_v4(),
        user_name: name.to_string(),
    }
}

/// Pops the next frame off a connection's queue and parses it.
fn next_signal(rx: &mut UnboundedReceiver<Message>) -> ServerSignal {
    let msg = rx.try_recv().expect("expected a queued frame");
    match msg {
        Message::Text(text) => {
            serde_json::from_str(text.as_str()).expect("frame should parse as ServerSignal")
        }
        other => panic!("expected a text frame, got: {other:?}"),
    }
}

fn assert_empty(rx: &mut UnboundedReceiver<Message>) {
    assert!(rx.try_recv().is_err(), "expected no queued frames");
}

// ---------------------------------------------------------------------------
// Test: unicast reaches only the addressed connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unicast_offer_reaches_only_the_target() {
    let registry = RoomRegistry::new();

    let mut rx_a = registry.register("a".to_string()).await;
    let mut rx_b = registry.register("b".to_string()).await;
    let mut rx_c = registry.register("c".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    registry.join_room("b", "room-1", user("bob")).await;
    registry.join_room("c", "room-1", user("carol")).await;
    // Drain the join announcements so only the offer remains.
    while rx_a.try_recv().is_ok() {}
    while rx_b.try_recv().is_ok() {}
    while rx_c.try_recv().is_ok() {}

    let sdp = json!({"type": "offer", "sdp": "v=0\r\no=- 46117 2 IN IP4 127.0.0.1"});
    let offer = ServerSignal::ReceiveOffer {
        from: "a".to_string(),
        sdp: sdp.clone(),
    };
    registry.send_to("b", &offer).await;

    // Only B receives it, payload unchanged.
    let received = next_signal(&mut rx_b);
    assert_eq!(
        received,
        ServerSignal::ReceiveOffer {
            from: "a".to_string(),
            sdp
        }
    );
    assert_empty(&mut rx_a);
    assert_empty(&mut rx_c);
}

#[tokio::test]
async fn unicast_to_unknown_target_is_silently_dropped() {
    let registry = RoomRegistry::new();
    let mut rx_a = registry.register("a".to_string()).await;

    let offer = ServerSignal::ReceiveOffer {
        from: "a".to_string(),
        sdp: json!({}),
    };
    registry.send_to("nobody", &offer).await;

    assert_empty(&mut rx_a);
}

// ---------------------------------------------------------------------------
// Test: join broadcast goes to existing members, never the joiner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_notifies_existing_members_only() {
    let registry = RoomRegistry::new();

    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("b", "room-1", user("bob")).await;

    let mut rx_a = registry.register("a".to_string()).await;
    let alice = user("alice");
    registry.join_room("a", "room-1", alice.clone()).await;

    // B receives exactly one user-joined with A's connection id.
    match next_signal(&mut rx_b) {
        ServerSignal::UserJoined { peer_id, user } => {
            assert_eq!(peer_id, "a");
            assert_eq!(user, alice);
        }
        other => panic!("expected user-joined, got: {other:?}"),
    }
    assert_empty(&mut rx_b);

    // A receives no self-notification.
    assert_empty(&mut rx_a);
}

#[tokio::test]
async fn repeated_joins_are_not_deduplicated() {
    let registry = RoomRegistry::new();

    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("b", "room-1", user("bob")).await;
    registry.register("a".to_string()).await;

    registry.join_room("a", "room-1", user("alice")).await;
    registry.join_room("a", "room-1", user("alice")).await;

    // Each join re-broadcasts; membership count stays at two.
    assert!(matches!(
        next_signal(&mut rx_b),
        ServerSignal::UserJoined { .. }
    ));
    assert!(matches!(
        next_signal(&mut rx_b),
        ServerSignal::UserJoined { .. }
    ));
    assert_eq!(registry.room_size("room-1").await, 2);
}

// ---------------------------------------------------------------------------
// Test: disconnect announces user-left to the departed connection's rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disconnect_broadcasts_user_left_to_shared_rooms_only() {
    let registry = RoomRegistry::new();

    registry.register("a".to_string()).await;
    let mut rx_b = registry.register("b".to_string()).await;
    let mut rx_c = registry.register("c".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    registry.join_room("b", "room-1", user("bob")).await;
    // C sits in an unrelated room and must not hear about A leaving.
    registry.join_room("c", "room-2", user("carol")).await;
    while rx_b.try_recv().is_ok() {}

    registry.disconnect("a").await;

    match next_signal(&mut rx_b) {
        ServerSignal::UserLeft { peer_id } => assert_eq!(peer_id, "a"),
        other => panic!("expected user-left, got: {other:?}"),
    }
    assert_empty(&mut rx_c);
    assert_eq!(registry.room_size("room-1").await, 1);
    assert_eq!(registry.connection_count().await, 2);
}

#[tokio::test]
async fn rejoin_after_disconnect_produces_fresh_broadcast() {
    let registry = RoomRegistry::new();

    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("b", "room-1", user("bob")).await;
    registry.register("a".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    while rx_b.try_recv().is_ok() {}

    registry.disconnect("a").await;
    assert!(matches!(
        next_signal(&mut rx_b),
        ServerSignal::UserLeft { .. }
    ));

    // No membership survives the disconnect: re-registering and re-joining
    // behaves like a first join.
    registry.register("a".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    assert!(matches!(
        next_signal(&mut rx_b),
        ServerSignal::UserJoined { peer_id, .. } if peer_id == "a"
    ));
}

// ---------------------------------------------------------------------------
// Test: broadcast mechanics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_broadcast_can_exclude_the_sender() {
    let registry = RoomRegistry::new();

    let mut rx_a = registry.register("a".to_string()).await;
    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    registry.join_room("b", "room-1", user("bob")).await;
    while rx_a.try_recv().is_ok() {}
    while rx_b.try_recv().is_ok() {}

    let started = ServerSignal::SessionStarted {
        session_id: "room-1".to_string(),
    };
    registry.broadcast_to_room("room-1", &started, Some("a")).await;

    assert_eq!(next_signal(&mut rx_b), started);
    assert_empty(&mut rx_a);
}

#[tokio::test]
async fn broadcast_skips_closed_channels() {
    let registry = RoomRegistry::new();

    let rx_a = registry.register("a".to_string()).await;
    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    registry.join_room("b", "room-1", user("bob")).await;
    while rx_b.try_recv().is_ok() {}

    // Drop A's receiver to close its channel; the broadcast must not panic.
    drop(rx_a);
    let started = ServerSignal::SessionStarted {
        session_id: "room-1".to_string(),
    };
    registry.broadcast_to_room("room-1", &started, None).await;

    assert_eq!(next_signal(&mut rx_b), started);
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let registry = RoomRegistry::new();

    let mut rx_a = registry.register("a".to_string()).await;
    let mut rx_b = registry.register("b".to_string()).await;
    registry.join_room("a", "room-1", user("alice")).await;
    assert_eq!(registry.connection_count().await, 2);

    registry.shutdown_all().await;

    assert_eq!(registry.connection_count().await, 0);
    assert_eq!(registry.room_size("room-1").await, 0);
    assert!(matches!(
        rx_a.recv().await,
        Some(Message::Close(None))
    ));
    assert!(matches!(
        rx_b.recv().await,
        Some(Message::Close(None))
    ));
}
