//! services/api/src/client/peer.rs
//!
//! Client-side peer management: one peer connection per remote participant,
//! created and torn down in response to relayed signaling events.
//!
//! The WebRTC engine itself sits behind the `PeerEngine`/`PeerConnection`
//! traits so native clients can plug in a real implementation and tests a
//! fake one. The manager is driven from a single event loop: every method
//! runs to completion before the next event is handled, so the peer
//! registry needs no locking.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::web::protocol::{ClientSignal, ServerSignal};

/// Errors surfaced by a peer connection implementation.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("Negotiation failed: {0}")]
    Negotiation(String),
    #[error("Connection is closed")]
    Closed,
}

/// A single point-to-point media channel with one remote participant.
///
/// Implementations own local track attachment and bind incoming remote
/// tracks to playback keyed by the peer id they were created for.
pub trait PeerConnection: Send {
    /// Produces a local SDP offer.
    fn create_offer(&mut self) -> Result<Value, PeerError>;

    /// Applies a remote offer and produces the local answer.
    fn create_answer(&mut self, remote_offer: &Value) -> Result<Value, PeerError>;

    /// Applies the remote answer to a previously offered connection.
    fn apply_answer(&mut self, remote_answer: &Value) -> Result<(), PeerError>;

    /// Adds a remote ICE candidate.
    fn add_ice_candidate(&mut self, candidate: &Value) -> Result<(), PeerError>;

    /// Releases the connection. Dropping without closing is allowed but
    /// implementations may leak native resources.
    fn close(&mut self);
}

/// Factory for peer connections.
///
/// The engine receives the outbound signal sender so its ICE machinery can
/// emit `send-ice-candidate` frames addressed to the owning peer as local
/// candidates surface.
pub trait PeerEngine: Send {
    fn create_connection(
        &mut self,
        peer_id: &str,
        signals: mpsc::UnboundedSender<ClientSignal>,
    ) -> Box<dyn PeerConnection>;
}

/// Owns the peer-id -> connection registry for one live session.
pub struct PeerManager<E: PeerEngine> {
    engine: E,
    signals: mpsc::UnboundedSender<ClientSignal>,
    peers: HashMap<String, Box<dyn PeerConnection>>,
}

impl<E: PeerEngine> PeerManager<E> {
    pub fn new(engine: E, signals: mpsc::UnboundedSender<ClientSignal>) -> Self {
        Self {
            engine,
            signals,
            peers: HashMap::new(),
        }
    }

    /// Dispatches one relayed event. Events that do not concern peer
    /// negotiation (join approvals, chat, session announcements) are
    /// ignored here; the surrounding client reacts to those.
    pub fn handle_signal(&mut self, signal: ServerSignal) {
        match signal {
            ServerSignal::UserJoined { peer_id, .. } => self.handle_user_joined(&peer_id),
            ServerSignal::ReceiveOffer { from, sdp } => self.handle_offer(&from, &sdp),
            ServerSignal::ReceiveAnswer { from, sdp } => self.handle_answer(&from, &sdp),
            ServerSignal::ReceiveIceCandidate { from, candidate } => {
                self.handle_candidate(&from, &candidate)
            }
            ServerSignal::UserLeft { peer_id } => self.handle_user_left(&peer_id),
            _ => {}
        }
    }

    /// A participant joined the room: open a connection and send it an offer.
    ///
    /// A repeated join for a known peer replaces the stale connection (the
    /// relay does not deduplicate joins).
    fn handle_user_joined(&mut self, peer_id: &str) {
        if let Some(mut stale) = self.peers.remove(peer_id) {
            debug!(peer_id, "Replacing stale connection on re-join");
            stale.close();
        }
        let mut conn = self.engine.create_connection(peer_id, self.signals.clone());
        match conn.create_offer() {
            Ok(sdp) => {
                let _ = self.signals.send(ClientSignal::SendOffer {
                    target: peer_id.to_string(),
                    sdp,
                });
                self.peers.insert(peer_id.to_string(), conn);
            }
            Err(e) => warn!(peer_id, "Failed to create offer: {}", e),
        }
    }

    /// An offer addressed to us: this is the answer side, so the connection
    /// is created on demand.
    fn handle_offer(&mut self, from: &str, sdp: &Value) {
        let conn = self.peers.entry(from.to_string()).or_insert_with(|| {
            self.engine.create_connection(from, self.signals.clone())
        });
        match conn.create_answer(sdp) {
            Ok(answer) => {
                let _ = self.signals.send(ClientSignal::SendAnswer {
                    target: from.to_string(),
                    sdp: answer,
                });
            }
            Err(e) => warn!(from, "Failed to answer offer: {}", e),
        }
    }

    /// An answer for an offer we sent earlier. Answers from unknown peers
    /// are dropped: there is no connection to apply them to.
    fn handle_answer(&mut self, from: &str, sdp: &Value) {
        match self.peers.get_mut(from) {
            Some(conn) => {
                if let Err(e) = conn.apply_answer(sdp) {
                    warn!(from, "Failed to apply answer: {}", e);
                }
            }
            None => debug!(from, "Dropping answer from unknown peer"),
        }
    }

    fn handle_candidate(&mut self, from: &str, candidate: &Value) {
        match self.peers.get_mut(from) {
            Some(conn) => {
                if let Err(e) = conn.add_ice_candidate(candidate) {
                    warn!(from, "Failed to add ICE candidate: {}", e);
                }
            }
            None => debug!(from, "Dropping candidate from unknown peer"),
        }
    }

    /// Teardown: close and discard the connection. No reference to the
    /// peer survives past this point.
    fn handle_user_left(&mut self, peer_id: &str) {
        if let Some(mut conn) = self.peers.remove(peer_id) {
            conn.close();
        }
    }

    pub fn has_peer(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Closes every connection, e.g. when the local participant leaves.
    pub fn close_all(&mut self) {
        for (_, mut conn) in self.peers.drain() {
            conn.close();
        }
    }
}
