//! services/api/src/web/rooms.rs
//!
//! In-memory room membership for the signaling relay.
//!
//! The registry is the only owner of room state: connection handles, the
//! room -> members map, and a reverse connection -> rooms index. Everything
//! lives in process memory; a relay restart loses all membership and
//! clients must re-join.

use std::collections::{HashMap, HashSet};

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::web::protocol::{RoomUser, ServerSignal};

/// Channel sender half for pushing frames to a WebSocket connection.
pub type SignalSender = mpsc::UnboundedSender<Message>;

#[derive(Default)]
struct RegistryInner {
    /// Every registered connection, joined to a room or not. Unicast
    /// targets are looked up here.
    connections: HashMap<String, SignalSender>,
    /// Room id -> member connection handles keyed by connection id.
    rooms: HashMap<String, HashMap<String, SignalSender>>,
    /// Reverse index: connection id -> rooms it joined. Keeps the
    /// disconnect broadcast scoped to exactly those rooms.
    memberships: HashMap<String, HashSet<String>>,
}

/// Manages all active signaling connections and their room memberships.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. All sends are fire-and-forget: a closed
/// or missing channel is skipped silently, matching WebRTC's best-effort
/// negotiation semantics.
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

impl RoomRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the frame channel so the caller can
    /// forward frames to the WebSocket sink.
    pub async fn register(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.write().await.connections.insert(conn_id, tx);
        rx
    }

    /// Adds a connection to a room and announces it to the other members.
    ///
    /// The joiner receives no self-notification. Repeated joins are not
    /// deduplicated: each call re-inserts the member and re-broadcasts
    /// `user-joined`. Rooms have no capacity limit.
    pub async fn join_room(&self, conn_id: &str, room_id: &str, user: RoomUser) {
        let mut inner = self.inner.write().await;
        let Some(sender) = inner.connections.get(conn_id).cloned() else {
            warn!(conn_id, "join-room from unregistered connection");
            return;
        };

        let announcement = frame(&ServerSignal::UserJoined {
            peer_id: conn_id.to_string(),
            user,
        });

        let members = inner.rooms.entry(room_id.to_string()).or_default();
        for (member_id, member) in members.iter() {
            if member_id != conn_id {
                let _ = member.send(announcement.clone());
            }
        }
        members.insert(conn_id.to_string(), sender);
        inner
            .memberships
            .entry(conn_id.to_string())
            .or_default()
            .insert(room_id.to_string());
    }

    /// Unicast a signal to a single connection. Frames addressed to an
    /// unknown target are dropped without notice to the sender.
    pub async fn send_to(&self, target: &str, signal: &ServerSignal) {
        let inner = self.inner.read().await;
        match inner.connections.get(target) {
            Some(sender) => {
                let _ = sender.send(frame(signal));
            }
            None => debug!(peer = target, "dropping signal to unknown target"),
        }
    }

    /// Broadcast a signal to every member of a room, optionally excluding
    /// one connection (typically the sender).
    pub async fn broadcast_to_room(
        &self,
        room_id: &str,
        signal: &ServerSignal,
        exclude: Option<&str>,
    ) {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room_id) else {
            debug!(room_id, "dropping broadcast to unknown room");
            return;
        };
        let message = frame(signal);
        for (member_id, member) in members.iter() {
            if Some(member_id.as_str()) != exclude {
                let _ = member.send(message.clone());
            }
        }
    }

    /// Removes a connection entirely and tells the rooms it had joined.
    ///
    /// `user-left` goes only to the departing connection's rooms, not to
    /// every connection in the process. Emptied rooms are dropped.
    pub async fn disconnect(&self, conn_id: &str) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(conn_id);

        let joined = inner.memberships.remove(conn_id).unwrap_or_default();
        let departure = frame(&ServerSignal::UserLeft {
            peer_id: conn_id.to_string(),
        });
        for room_id in joined {
            if let Some(members) = inner.rooms.get_mut(&room_id) {
                members.remove(conn_id);
                for member in members.values() {
                    let _ = member.send(departure.clone());
                }
                if members.is_empty() {
                    inner.rooms.remove(&room_id);
                }
            }
        }
    }

    /// Return the current number of members in a room.
    pub async fn room_size(&self, room_id: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Return the current number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Send a Close frame to every connection, then clear all state.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.connections.len();
        for sender in inner.connections.values() {
            let _ = sender.send(Message::Close(None));
        }
        inner.connections.clear();
        inner.rooms.clear();
        inner.memberships.clear();
        tracing::info!(count, "Closed all signaling connections");
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes a signal into a text frame.
fn frame(signal: &ServerSignal) -> Message {
    // Serialization of these enums cannot fail: every payload is already
    // valid JSON or a plain string.
    let json = serde_json::to_string(signal).unwrap_or_default();
    Message::Text(json.into())
}
