//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a signaling connection.
//! It registers the connection with the room registry, relays validated
//! frames, and tears the membership down exactly once on disconnect.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::web::{
    protocol::{ClientSignal, ServerSignal},
    state::AppState,
};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>, // from auth middleware
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user_id))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, user_id: Uuid) {
    // The connection id doubles as the peer id other participants address
    // offers and answers to.
    let conn_id = Uuid::new_v4().to_string();
    info!(%user_id, conn_id, "New signaling connection established");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut outbound = app_state.rooms.register(conn_id.clone()).await;

    // --- 1. Outbound Forwarding Task ---
    // Drains frames queued by the registry into the socket sink. Ends when
    // the registry sends a Close frame or the sink errors out.
    let forward_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let closing = matches!(message, Message::Close(_));
            if ws_sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    // --- 2. Main Message Loop ---
    loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                handle_signal(&text, &conn_id, &app_state).await;
            }
            Some(Ok(Message::Close(_))) => {
                info!(conn_id, "Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(conn_id, error = %e, "Transport error, closing connection.");
                break;
            }
            None => {
                info!(conn_id, "Client disconnected.");
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    // Leaves every joined room and announces `user-left` to those rooms.
    app_state.rooms.disconnect(&conn_id).await;
    forward_task.abort();
    info!(conn_id, "Signaling connection closed.");
}

/// Validates one inbound frame and dispatches it to the registry.
///
/// Malformed frames are logged and dropped. Frames that parse but fail
/// validation are answered with an `error` frame; everything else is
/// relayed fire-and-forget.
async fn handle_signal(text: &str, conn_id: &str, app_state: &Arc<AppState>) {
    let signal = match serde_json::from_str::<ClientSignal>(text) {
        Ok(signal) => signal,
        Err(e) => {
            warn!(conn_id, "Failed to deserialize client signal: {}", e);
            return;
        }
    };

    match signal {
        ClientSignal::JoinRoom { room_id, user } => {
            if room_id.is_empty() {
                reject(conn_id, app_state, "join-room requires a room id").await;
                return;
            }
            app_state.rooms.join_room(conn_id, &room_id, user).await;
        }
        ClientSignal::SendOffer { target, sdp } => {
            if target.is_empty() {
                reject(conn_id, app_state, "send-offer requires a target").await;
                return;
            }
            let relayed = ServerSignal::ReceiveOffer {
                from: conn_id.to_string(),
                sdp,
            };
            app_state.rooms.send_to(&target, &relayed).await;
        }
        ClientSignal::SendAnswer { target, sdp } => {
            if target.is_empty() {
                reject(conn_id, app_state, "send-answer requires a target").await;
                return;
            }
            let relayed = ServerSignal::ReceiveAnswer {
                from: conn_id.to_string(),
                sdp,
            };
            app_state.rooms.send_to(&target, &relayed).await;
        }
        ClientSignal::SendIceCandidate { target, candidate } => {
            if target.is_empty() {
                reject(conn_id, app_state, "send-ice-candidate requires a target").await;
                return;
            }
            let relayed = ServerSignal::ReceiveIceCandidate {
                from: conn_id.to_string(),
                candidate,
            };
            app_state.rooms.send_to(&target, &relayed).await;
        }
        ClientSignal::UserJoinRequest {
            session_id,
            user_id,
            user_name,
        } => {
            let relayed = ServerSignal::UserJoinRequest {
                session_id: session_id.clone(),
                user_id,
                user_name,
                peer_id: conn_id.to_string(),
            };
            app_state
                .rooms
                .broadcast_to_room(&session_id, &relayed, Some(conn_id))
                .await;
        }
        ClientSignal::ApproveJoin {
            session_id,
            user_id,
        } => {
            let relayed = ServerSignal::ApproveJoin {
                session_id: session_id.clone(),
                user_id,
            };
            app_state
                .rooms
                .broadcast_to_room(&session_id, &relayed, Some(conn_id))
                .await;
        }
        ClientSignal::RejectJoin {
            session_id,
            user_id,
        } => {
            let relayed = ServerSignal::RejectJoin {
                session_id: session_id.clone(),
                user_id,
            };
            app_state
                .rooms
                .broadcast_to_room(&session_id, &relayed, Some(conn_id))
                .await;
        }
        ClientSignal::SessionStarted { session_id } => {
            let relayed = ServerSignal::SessionStarted {
                session_id: session_id.clone(),
            };
            app_state
                .rooms
                .broadcast_to_room(&session_id, &relayed, Some(conn_id))
                .await;
        }
        ClientSignal::SendMessage { chat_id, message } => {
            // Chat rides the same relay, scoped to its own room namespace.
            let room = format!("chat_{}", chat_id);
            let relayed = ServerSignal::ReceiveMessage { chat_id, message };
            app_state
                .rooms
                .broadcast_to_room(&room, &relayed, Some(conn_id))
                .await;
        }
    }
}

async fn reject(conn_id: &str, app_state: &Arc<AppState>, message: &str) {
    let error = ServerSignal::Error {
        message: message.to_string(),
    };
    app_state.rooms.send_to(conn_id, &error).await;
}
