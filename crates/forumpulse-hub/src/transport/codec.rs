//! Decode-once codec for the transport layer.
//!
//! - Text frames => `Envelope` (routing keys validated by the enum shape)
//! - Binary frames => rejected (the wire contract is JSON text only)
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;

use forumpulse_core::error::{HubError, Result};
use forumpulse_core::protocol::Envelope;

#[derive(Debug)]
pub enum Inbound {
    Envelope(Envelope),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let env: Envelope = serde_json::from_str(&s)
                .map_err(|e| HubError::BadRequest(format!("invalid envelope json: {e}")))?;
            Ok(Inbound::Envelope(env))
        }
        Message::Binary(_) => Err(HubError::BadRequest("binary frames not supported".into())),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_decodes_to_envelope() {
        let msg = Message::Text(r#"{"type":"broadcast","data":{"content":"hi"}}"#.into());
        match decode(msg) {
            Ok(Inbound::Envelope(env)) => assert_eq!(env.kind(), "broadcast"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn binary_is_rejected() {
        let res = decode(Message::Binary(vec![0x01, 0x02]));
        assert!(res.is_err());
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let res = decode(Message::Text("{not json".into()));
        match res {
            Err(HubError::BadRequest(_)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
