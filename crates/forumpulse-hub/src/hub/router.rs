//! Message router: resolves routing intents into per-connection enqueues.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::{Map, Value};

use forumpulse_core::error::{HubError, Result};
use forumpulse_core::protocol::{ChatPayload, Envelope};
use forumpulse_core::{ConversationId, UserId};

use crate::directory::ConversationDirectory;
use crate::hub::connection::Connection;
use crate::hub::registry::ConnectionRegistry;
use crate::obs::HubMetrics;

/// Result of a direct send: either how many connections accepted the
/// envelope, or the recipient was unreachable. `Dropped` is an outcome,
/// not an error: delivery is best-effort, at-most-once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(usize),
    Dropped,
}

/// Envelope serialized once, sent N times (fan-out never re-encodes).
pub struct PreparedEnvelope {
    kind: &'static str,
    text: String,
}

impl PreparedEnvelope {
    pub fn prepare(env: &Envelope) -> Result<Self> {
        let text = serde_json::to_string(env)
            .map_err(|e| HubError::Internal(format!("envelope encode failed: {e}")))?;
        Ok(Self {
            kind: env.kind(),
            text,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn to_message(&self) -> Message {
        Message::Text(self.text.clone())
    }
}

/// Routes direct, broadcast, and conversation-scoped envelopes via the
/// registry. Individual connection failures are isolated: an overflowing or
/// closed connection never aborts delivery to the remaining recipients.
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    directory: Arc<dyn ConversationDirectory>,
    metrics: Arc<HubMetrics>,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        directory: Arc<dyn ConversationDirectory>,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        Self {
            registry,
            directory,
            metrics,
        }
    }

    /// Wrap `body` as a `private_message` from `sender` and enqueue it on
    /// every open connection of `recipient`. An offline recipient is a
    /// silent drop, with no queuing for later delivery.
    pub fn send_direct(
        &self,
        sender: UserId,
        recipient: UserId,
        body: Map<String, Value>,
    ) -> Result<DeliveryOutcome> {
        let env = Envelope::PrivateMessage(ChatPayload {
            sender_id: Some(sender),
            ..ChatPayload::from_body(body)
        });
        let prepared = PreparedEnvelope::prepare(&env)?;

        let conns = self.registry.connections_for(recipient);
        if conns.is_empty() {
            tracing::debug!(sender, recipient, "direct message dropped: recipient offline");
            self.metrics.delivery_dropped("offline");
            return Ok(DeliveryOutcome::Dropped);
        }

        let mut delivered = 0;
        for conn in &conns {
            if self.deliver(conn, &prepared) {
                delivered += 1;
            }
        }
        if delivered == 0 {
            Ok(DeliveryOutcome::Dropped)
        } else {
            Ok(DeliveryOutcome::Delivered(delivered))
        }
    }

    /// Send `body` as a `broadcast` envelope to every registered connection,
    /// skipping `exclude` if given. Returns how many connections accepted it.
    pub fn broadcast(&self, body: Map<String, Value>, exclude: Option<UserId>) -> Result<usize> {
        let env = Envelope::Broadcast(ChatPayload::from_body(body));
        self.broadcast_envelope(&env, exclude)
    }

    /// Fan any envelope out to every registered connection except `exclude`.
    /// Works against a registry snapshot so no lock is held during delivery.
    pub fn broadcast_envelope(&self, env: &Envelope, exclude: Option<UserId>) -> Result<usize> {
        let prepared = PreparedEnvelope::prepare(env)?;
        let mut delivered = 0;
        for conn in self.registry.snapshot_all() {
            if Some(conn.user_id()) == exclude {
                continue;
            }
            if self.deliver(&conn, &prepared) {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Wrap `body` as a conversation `message` and deliver it to every
    /// participant other than the sender. Returns connections reached.
    pub async fn send_to_conversation(
        &self,
        sender: UserId,
        conversation: ConversationId,
        body: Map<String, Value>,
    ) -> Result<usize> {
        let participants = self.directory.participants(conversation).await?;
        let env = Envelope::Message(ChatPayload {
            sender_id: Some(sender),
            conversation_id: Some(conversation),
            ..ChatPayload::from_body(body)
        });
        let targets: Vec<UserId> = participants.into_iter().filter(|u| *u != sender).collect();
        self.fan_out_to_users(&targets, &env)
    }

    /// Deliver one envelope to every open connection of each listed user.
    /// Serializes once; offline users are skipped silently.
    pub fn fan_out_to_users(&self, users: &[UserId], env: &Envelope) -> Result<usize> {
        let prepared = PreparedEnvelope::prepare(env)?;
        let mut delivered = 0;
        for user in users {
            for conn in self.registry.connections_for(*user) {
                if self.deliver(&conn, &prepared) {
                    delivered += 1;
                }
            }
        }
        Ok(delivered)
    }

    /// Enqueue on one connection, applying the overflow-closes policy.
    fn deliver(&self, conn: &Arc<Connection>, prepared: &PreparedEnvelope) -> bool {
        match conn.send(prepared.to_message()) {
            Ok(()) => {
                self.metrics.envelope_delivered(prepared.kind());
                true
            }
            Err(HubError::QueueOverflow) => {
                // A persistently slow peer is treated as failed: close it
                // instead of buffering without bound or dropping silently.
                tracing::warn!(
                    user = conn.user_id(),
                    conn = conn.id(),
                    kind = prepared.kind(),
                    "outbound queue overflow, closing connection"
                );
                conn.close();
                self.metrics.delivery_dropped("overflow");
                false
            }
            Err(_) => {
                tracing::debug!(
                    user = conn.user_id(),
                    conn = conn.id(),
                    kind = prepared.kind(),
                    "delivery skipped: connection not open"
                );
                self.metrics.delivery_dropped("closed");
                false
            }
        }
    }
}
