//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket signaling protocol between clients and the relay.
//!
//! Every frame is a tagged JSON object; the tag is the event name on the
//! wire. SDP offers/answers and ICE candidates are carried as opaque JSON
//! values: the relay forwards them verbatim and never inspects negotiation
//! content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity a participant presents when joining a room. Broadcast to the
/// other members so they can label the new peer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoomUser {
    pub user_id: Uuid,
    pub user_name: String,
}

//=========================================================================================
// Messages Sent FROM the Client TO the Relay
//=========================================================================================

/// Represents the structured signaling frames a client can send to the relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientSignal {
    /// Registers the caller's connection under a room. The other members
    /// receive a `user-joined` event; the caller does not.
    JoinRoom { room_id: String, user: RoomUser },

    /// Unicast an SDP offer to the connection identified by `target`.
    SendOffer {
        target: String,
        sdp: serde_json::Value,
    },

    /// Unicast an SDP answer to the connection identified by `target`.
    SendAnswer {
        target: String,
        sdp: serde_json::Value,
    },

    /// Unicast an ICE candidate to the connection identified by `target`.
    SendIceCandidate {
        target: String,
        candidate: serde_json::Value,
    },

    /// Asks the room (expected recipient: the session host) to admit the
    /// named user. Ephemeral; nothing is persisted.
    UserJoinRequest {
        session_id: String,
        user_id: Uuid,
        user_name: String,
    },

    /// Host decision: admit the user. Broadcast so the matching client can
    /// react.
    ApproveJoin { session_id: String, user_id: Uuid },

    /// Host decision: deny the user.
    RejectJoin { session_id: String, user_id: Uuid },

    /// Announces that the session has begun.
    SessionStarted { session_id: String },

    /// Chat message, relayed to room `chat_{chat_id}`.
    SendMessage {
        chat_id: String,
        message: serde_json::Value,
    },
}

//=========================================================================================
// Messages Sent FROM the Relay TO the Client
//=========================================================================================

/// Represents the structured signaling frames the relay sends to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerSignal {
    /// A new participant joined the room. `peer_id` is the joiner's
    /// connection id, usable as a unicast target.
    UserJoined { peer_id: String, user: RoomUser },

    ReceiveOffer {
        from: String,
        sdp: serde_json::Value,
    },

    ReceiveAnswer {
        from: String,
        sdp: serde_json::Value,
    },

    ReceiveIceCandidate {
        from: String,
        candidate: serde_json::Value,
    },

    /// Relayed admission request, carrying the requester's connection id.
    UserJoinRequest {
        session_id: String,
        user_id: Uuid,
        user_name: String,
        peer_id: String,
    },

    ApproveJoin { session_id: String, user_id: Uuid },

    RejectJoin { session_id: String, user_id: Uuid },

    SessionStarted { session_id: String },

    /// A participant's connection closed. Sent to every room the
    /// connection had joined.
    UserLeft { peer_id: String },

    ReceiveMessage {
        chat_id: String,
        message: serde_json::Value,
    },

    /// Reports a rejected frame back to its sender. Relay failures are
    /// otherwise silent (fire-and-forget).
    Error { message: String },
}
