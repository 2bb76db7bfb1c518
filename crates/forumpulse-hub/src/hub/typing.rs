//! Typing relay: stateless fan-out of typing indicators.

use std::sync::Arc;

use forumpulse_core::error::Result;
use forumpulse_core::protocol::Envelope;
use forumpulse_core::{ConversationId, UserId};

use crate::directory::ConversationDirectory;
use crate::hub::router::MessageRouter;

/// Translates a typing event into `typing_indicator` envelopes for the other
/// participants of a conversation. Holds no state between calls; expiry or
/// debouncing is a policy for the caller to layer on top.
pub struct TypingRelay {
    router: Arc<MessageRouter>,
    directory: Arc<dyn ConversationDirectory>,
}

impl TypingRelay {
    pub fn new(router: Arc<MessageRouter>, directory: Arc<dyn ConversationDirectory>) -> Self {
        Self { router, directory }
    }

    /// Relay `is_typing` for `user_id` to every other participant of the
    /// conversation. Returns connections reached.
    pub async fn typing(
        &self,
        user_id: UserId,
        conversation: ConversationId,
        is_typing: bool,
    ) -> Result<usize> {
        let participants = self.directory.participants(conversation).await?;
        let targets: Vec<UserId> = participants.into_iter().filter(|u| *u != user_id).collect();
        let env = Envelope::typing(user_id, is_typing);
        self.router.fan_out_to_users(&targets, &env)
    }
}
