//! Collaborator contracts the hub consumes, plus an in-memory fixture.
//!
//! Session resolution and conversation membership live in the surrounding
//! forum application; the hub only sees these two traits.

use async_trait::async_trait;
use dashmap::DashMap;

use forumpulse_core::error::{HubError, Result};
use forumpulse_core::{ConversationId, UserId};

/// Maps an opaque session token to a user identity.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<UserId>;
}

/// Resolves a conversation id to its member user ids.
#[async_trait]
pub trait ConversationDirectory: Send + Sync {
    async fn participants(&self, conversation: ConversationId) -> Result<Vec<UserId>>;
}

/// In-memory implementation of both contracts.
///
/// Backs the dev binary and the integration tests; a real deployment wires
/// the forum's session store and conversation tables in instead.
#[derive(Default)]
pub struct StaticDirectory {
    sessions: DashMap<String, UserId>,
    conversations: DashMap<ConversationId, Vec<UserId>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, token: &str, user_id: UserId) -> Self {
        self.sessions.insert(token.to_string(), user_id);
        self
    }

    pub fn with_conversation(self, conversation: ConversationId, members: &[UserId]) -> Self {
        self.conversations.insert(conversation, members.to_vec());
        self
    }

    pub fn insert_session(&self, token: &str, user_id: UserId) {
        self.sessions.insert(token.to_string(), user_id);
    }

    pub fn revoke_session(&self, token: &str) {
        self.sessions.remove(token);
    }
}

#[async_trait]
impl SessionValidator for StaticDirectory {
    async fn validate(&self, token: &str) -> Result<UserId> {
        self.sessions
            .get(token)
            .map(|e| *e.value())
            .ok_or(HubError::AuthFailed)
    }
}

#[async_trait]
impl ConversationDirectory for StaticDirectory {
    async fn participants(&self, conversation: ConversationId) -> Result<Vec<UserId>> {
        Ok(self
            .conversations
            .get(&conversation)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}
