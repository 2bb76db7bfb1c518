//! The tagged message unit exchanged over a live connection.
//!
//! Wire shape: `{"type": <string>, "data": <object>}`. The `type` discriminant
//! selects a fixed payload shape; unknown types fail deserialization at the
//! routing boundary rather than leaking into duck-typed access downstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::presence::{OnlineStatusPayload, PresenceStatus};
use crate::protocol::{ConversationId, UserId};

/// Envelope exchanged over a live connection.
///
/// Chat-style payloads (`message`, `private_message`, `broadcast`,
/// `conversation_update`) carry the sender's JSON keys untouched; the hub
/// only adds routing metadata (`sender_id`). Ephemeral payloads
/// (`typing_indicator`, `online_status`, `user_joined`, `user_left`) have
/// fully fixed shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Envelope {
    /// Conversation-scoped chat message.
    Message(ChatPayload),
    /// Direct user-to-user message.
    PrivateMessage(ChatPayload),
    /// Hub-wide announcement.
    Broadcast(ChatPayload),
    /// Ephemeral "user is typing" relay.
    TypingIndicator(TypingPayload),
    /// Online/offline presence transition.
    OnlineStatus(OnlineStatusPayload),
    /// Conversation membership/metadata change.
    ConversationUpdate(ChatPayload),
    /// A user became reachable on the hub.
    UserJoined(UserEventPayload),
    /// A user's last connection went away.
    UserLeft(UserEventPayload),
}

impl Envelope {
    /// The wire `type` string for this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Message(_) => "message",
            Envelope::PrivateMessage(_) => "private_message",
            Envelope::Broadcast(_) => "broadcast",
            Envelope::TypingIndicator(_) => "typing_indicator",
            Envelope::OnlineStatus(_) => "online_status",
            Envelope::ConversationUpdate(_) => "conversation_update",
            Envelope::UserJoined(_) => "user_joined",
            Envelope::UserLeft(_) => "user_left",
        }
    }

    pub fn typing(user_id: UserId, is_typing: bool) -> Self {
        Envelope::TypingIndicator(TypingPayload {
            user_id,
            is_typing,
            conversation_id: None,
        })
    }

    pub fn online_status(user_id: UserId, status: PresenceStatus) -> Self {
        Envelope::OnlineStatus(OnlineStatusPayload { user_id, status })
    }

    pub fn user_joined(user_id: UserId) -> Self {
        Envelope::UserJoined(UserEventPayload { user_id })
    }

    pub fn user_left(user_id: UserId) -> Self {
        Envelope::UserLeft(UserEventPayload { user_id })
    }
}

/// Payload for chat-style envelopes.
///
/// `body` holds the sender-supplied JSON keys verbatim (`#[serde(flatten)]`),
/// so payload values pass through the hub unmodified. The routing fields are
/// read at the transport boundary on the way in, and `sender_id` is stamped
/// by the router on the way out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Originating user, stamped by the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    /// Target conversation for `message` / `conversation_update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    /// Target user for `private_message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<UserId>,
    /// Sender-supplied payload keys, preserved verbatim.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ChatPayload {
    /// Payload carrying only the sender's body keys.
    pub fn from_body(body: Map<String, Value>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }
}

/// Payload for `typing_indicator`.
///
/// Outbound relays carry only `{user_id, is_typing}`; inbound client frames
/// additionally name the conversation being typed into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingPayload {
    pub user_id: UserId,
    pub is_typing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

/// Payload for `user_joined` / `user_left`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEventPayload {
    pub user_id: UserId,
}
