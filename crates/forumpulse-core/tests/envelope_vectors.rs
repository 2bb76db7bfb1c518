//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use forumpulse_core::protocol::{Envelope, PresenceStatus};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_typing_indicator() {
    let s = load("typing_indicator.json");
    let env: Envelope = serde_json::from_str(&s).unwrap();
    assert_eq!(env.kind(), "typing_indicator");
    let Envelope::TypingIndicator(p) = env else {
        panic!("wrong variant");
    };
    assert_eq!(p.user_id, 1);
    assert!(p.is_typing);
    assert_eq!(p.conversation_id, Some(7));
}

#[test]
fn parse_online_status() {
    let s = load("online_status.json");
    let env: Envelope = serde_json::from_str(&s).unwrap();
    let Envelope::OnlineStatus(p) = env else {
        panic!("wrong variant");
    };
    assert_eq!(p.user_id, 42);
    assert_eq!(p.status, PresenceStatus::Offline);
}

#[test]
fn parse_private_message_keeps_body_keys() {
    let s = load("private_message.json");
    let env: Envelope = serde_json::from_str(&s).unwrap();
    let Envelope::PrivateMessage(p) = env else {
        panic!("wrong variant");
    };
    assert_eq!(p.recipient_id, Some(2));
    assert_eq!(p.sender_id, None);
    assert_eq!(
        p.body.get("content").and_then(|v| v.as_str()),
        Some("Hello from user 1")
    );
    assert!(p.body.contains_key("attachments"));
}

#[test]
fn unknown_type_is_rejected() {
    let s = load("unknown_type.json");
    let res: Result<Envelope, _> = serde_json::from_str(&s);
    assert!(res.is_err());
}

#[test]
fn typing_relay_shape_omits_conversation() {
    let env = Envelope::typing(3, false);
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(json["type"], "typing_indicator");
    assert_eq!(json["data"]["user_id"], 3);
    assert_eq!(json["data"]["is_typing"], false);
    assert!(json["data"].get("conversation_id").is_none());
}

#[test]
fn chat_body_survives_round_trip() {
    let s = load("private_message.json");
    let env: Envelope = serde_json::from_str(&s).unwrap();
    let out = serde_json::to_string(&env).unwrap();
    let back: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(back["data"]["content"], "Hello from user 1");
    assert_eq!(back["data"]["recipient_id"], 2);
}
