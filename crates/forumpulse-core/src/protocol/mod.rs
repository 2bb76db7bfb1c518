//! Protocol modules for the realtime layer.
//!
//! The wire format is a single JSON envelope shape,
//! `{"type": <string>, "data": <object>}`, with a fixed payload shape per
//! type. Parsing is panic-free: malformed input is reported as `HubError`
//! instead of panicking, keeping the hub resilient to hostile traffic.

pub mod envelope;
pub mod presence;

pub use envelope::{ChatPayload, Envelope, TypingPayload, UserEventPayload};
pub use presence::{OnlineStatusPayload, PresenceRecord, PresenceStatus};

/// Forum user identity, as resolved by the external session validator.
pub type UserId = i64;

/// Conversation identity, as understood by the external participant lookup.
pub type ConversationId = i64;
