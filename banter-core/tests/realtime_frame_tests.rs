//! Tests for realtime wire frames
//!
//! Inbound parsing for every server frame type, outbound event shapes,
//! and close-code classification.

use banter_core::realtime::*;

fn parse(raw: &str) -> InboundFrame {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn test_parse_chat_message() {
    let frame = parse(
        r#"{
            "type": "chat.message",
            "message": {
                "message_id": "m-100",
                "content": "lunch?",
                "message_type": "text",
                "metadata": {"client": "android"},
                "user_id": "u-1",
                "username": "ana"
            },
            "timestamp": "2026-08-28T09:30:00Z"
        }"#,
    );

    match frame {
        InboundFrame::ChatMessage { message, timestamp } => {
            assert_eq!(message.message_id.as_deref(), Some("m-100"));
            assert_eq!(message.content, "lunch?");
            assert_eq!(message.message_type, "text");
            assert_eq!(message.username.as_deref(), Some("ana"));
            assert!(message.media_id.is_none());
            assert!(timestamp.is_some());
        }
        other => panic!("expected chat message, got {:?}", other),
    }
}

#[test]
fn test_parse_chat_message_minimal_body() {
    // Servers may omit everything but content and message_type
    let frame = parse(
        r#"{"type":"chat.message","message":{"content":"ok","message_type":"text"}}"#,
    );
    match frame {
        InboundFrame::ChatMessage { message, timestamp } => {
            assert!(message.message_id.is_none());
            assert!(message.user_id.is_none());
            assert!(timestamp.is_none());
        }
        other => panic!("expected chat message, got {:?}", other),
    }
}

#[test]
fn test_parse_typing_indicator() {
    let frame = parse(r#"{"type":"typing.indicator","user_id":"u-2","is_typing":true}"#);
    assert_eq!(frame.category(), FrameCategory::Typing);
    match frame {
        InboundFrame::Typing {
            user_id, is_typing, ..
        } => {
            assert_eq!(user_id, "u-2");
            assert!(is_typing);
        }
        other => panic!("expected typing, got {:?}", other),
    }
}

#[test]
fn test_parse_read_receipt() {
    let frame = parse(r#"{"type":"read.receipt","message_id":"m-5","user_id":"u-2"}"#);
    assert_eq!(frame.category(), FrameCategory::Receipt);
}

#[test]
fn test_parse_reaction() {
    let frame = parse(
        r#"{"type":"message.reaction","message_id":"m-5","emoji":"👍","action":"remove","user_id":"u-2"}"#,
    );
    match frame {
        InboundFrame::Reaction { emoji, action, .. } => {
            assert_eq!(emoji, "👍");
            assert_eq!(action, ReactionAction::Remove);
        }
        other => panic!("expected reaction, got {:?}", other),
    }
}

#[test]
fn test_parse_presence_frames() {
    let online = parse(r#"{"type":"user.online","user_id":"u-3","username":"bo"}"#);
    let offline = parse(r#"{"type":"user.offline","user_id":"u-3"}"#);
    assert_eq!(online.category(), FrameCategory::Presence);
    assert_eq!(offline.category(), FrameCategory::Presence);
}

#[test]
fn test_parse_heartbeat_both_events() {
    let ping = parse(r#"{"type":"heartbeat","event":"ping"}"#);
    let pong = parse(r#"{"type":"heartbeat","event":"pong"}"#);
    assert!(matches!(
        ping,
        InboundFrame::Heartbeat {
            event: HeartbeatEvent::Ping,
            ..
        }
    ));
    assert!(matches!(
        pong,
        InboundFrame::Heartbeat {
            event: HeartbeatEvent::Pong,
            ..
        }
    ));
}

#[test]
fn test_parse_server_error() {
    let frame = parse(
        r#"{"type":"error","code":"rate_limited","message":"slow down","details":{"retry_in":5}}"#,
    );
    match frame {
        InboundFrame::Error { code, details, .. } => {
            assert_eq!(code, "rate_limited");
            assert_eq!(details.unwrap()["retry_in"], 5);
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_type_is_unknown_not_error() {
    let frame = parse(r#"{"type":"calls.offer","sdp":"..."}"#);
    assert_eq!(frame, InboundFrame::Unknown);
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let result: Result<InboundFrame, _> = serde_json::from_str("{{{not json");
    assert!(result.is_err());
}

#[test]
fn test_outbound_send_message_shape() {
    let frame = OutboundFrame::message(
        "photo",
        "image",
        serde_json::json!({"w": 640}),
        Some("media-9".into()),
    );
    let value = serde_json::to_value(frame).unwrap();

    assert_eq!(value["event"], "send_message");
    assert_eq!(value["content"], "photo");
    assert_eq!(value["message_type"], "image");
    assert_eq!(value["media_id"], "media-9");
    assert_eq!(value["metadata"]["w"], 640);
    assert!(value["timestamp"].is_string());
}

#[test]
fn test_outbound_reaction_event_encodes_action() {
    let add = serde_json::to_value(OutboundFrame::reaction("m-1", "🎉", ReactionAction::Add))
        .unwrap();
    assert_eq!(add["event"], "add_reaction");
    assert_eq!(add["action"], "add");

    let remove =
        serde_json::to_value(OutboundFrame::reaction("m-1", "🎉", ReactionAction::Remove))
            .unwrap();
    assert_eq!(remove["event"], "remove_reaction");
    assert_eq!(remove["action"], "remove");
}

#[test]
fn test_outbound_presence_and_receipt_shapes() {
    let presence = serde_json::to_value(OutboundFrame::presence(PresenceStatus::Online)).unwrap();
    assert_eq!(presence["event"], "presence_update");
    assert_eq!(presence["presence_status"], "online");

    let receipt = serde_json::to_value(OutboundFrame::read_receipt("m-2")).unwrap();
    assert_eq!(receipt["event"], "mark_read");
    assert_eq!(receipt["message_id"], "m-2");
}

#[test]
fn test_outbound_heartbeats_are_flagged() {
    assert!(OutboundFrame::ping().is_heartbeat());
    assert!(OutboundFrame::pong().is_heartbeat());
    assert!(!OutboundFrame::typing(true).is_heartbeat());

    let ping = serde_json::to_value(OutboundFrame::ping()).unwrap();
    assert_eq!(ping["event"], "ping");
}

#[test]
fn test_close_code_mapping() {
    assert_eq!(CloseCode::from_u16(1000), CloseCode::Normal);
    assert_eq!(CloseCode::from_u16(1006), CloseCode::Abnormal);
    assert_eq!(CloseCode::from_u16(4001), CloseCode::AuthFailure);
    assert_eq!(CloseCode::from_u16(4004), CloseCode::Forbidden);
    assert_eq!(CloseCode::from_u16(1011), CloseCode::Other(1011));
    assert_eq!(CloseCode::Forbidden.to_string(), "4004");
}
