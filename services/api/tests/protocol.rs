//! Wire-format tests for the signaling protocol.
//!
//! Clients match on the `type` tag by event name, so the tags are part of
//! the public contract and must not drift.

use serde_json::json;
use uuid::Uuid;

use api_lib::web::protocol::{ClientSignal, RoomUser, ServerSignal};

#[test]
fn client_frames_use_kebab_case_event_tags() {
    let join = ClientSignal::JoinRoom {
        room_id: "room-1".to_string(),
        user: RoomUser {
            user_id: Uuid::new_v4(),
            user_name: "alice".to_string(),
        },
    };
    let value = serde_json::to_value(&join).unwrap();
    assert_eq!(value["type"], "join-room");

    let candidate = ClientSignal::SendIceCandidate {
        target: "p1".to_string(),
        candidate: json!({"candidate": "candidate:1"}),
    };
    let value = serde_json::to_value(&candidate).unwrap();
    assert_eq!(value["type"], "send-ice-candidate");
}

#[test]
fn server_frames_use_kebab_case_event_tags() {
    let left = ServerSignal::UserLeft {
        peer_id: "p1".to_string(),
    };
    assert_eq!(serde_json::to_value(&left).unwrap()["type"], "user-left");

    let offer = ServerSignal::ReceiveOffer {
        from: "p1".to_string(),
        sdp: json!({"type": "offer"}),
    };
    assert_eq!(
        serde_json::to_value(&offer).unwrap()["type"],
        "receive-offer"
    );
}

#[test]
fn raw_join_request_frame_parses() {
    let user_id = Uuid::new_v4();
    let raw = format!(
        r#"{{"type":"user-join-request","session_id":"s1","user_id":"{user_id}","user_name":"bob"}}"#
    );

    let parsed: ClientSignal = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        parsed,
        ClientSignal::UserJoinRequest {
            session_id: "s1".to_string(),
            user_id,
            user_name: "bob".to_string(),
        }
    );
}

#[test]
fn sdp_payloads_survive_relay_translation_verbatim() {
    // The relay re-tags a send-offer as receive-offer but must carry the
    // SDP payload through untouched.
    let sdp = json!({"type": "offer", "sdp": "v=0\r\no=- 4611 2 IN IP4 127.0.0.1\r\n"});
    let sent = ClientSignal::SendOffer {
        target: "p2".to_string(),
        sdp: sdp.clone(),
    };

    let ClientSignal::SendOffer { sdp: carried, .. } = sent else {
        unreachable!()
    };
    let relayed = ServerSignal::ReceiveOffer {
        from: "p1".to_string(),
        sdp: carried,
    };
    let value = serde_json::to_value(&relayed).unwrap();
    assert_eq!(value["sdp"], sdp);
}

#[test]
fn malformed_frames_fail_to_parse() {
    assert!(serde_json::from_str::<ClientSignal>(r#"{"type":"no-such-event"}"#).is_err());
    assert!(serde_json::from_str::<ClientSignal>(r#"{"type":"join-room"}"#).is_err());
}
