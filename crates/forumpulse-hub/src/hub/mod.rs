//! Hub core: registry, connections, routing, presence, typing.

pub mod connection;
pub mod presence;
pub mod registry;
pub mod router;
pub mod typing;

pub use connection::{Connection, ConnectionId};
pub use presence::PresenceTracker;
pub use registry::ConnectionRegistry;
pub use router::{DeliveryOutcome, MessageRouter, PreparedEnvelope};
pub use typing::TypingRelay;

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use forumpulse_core::error::Result;
use forumpulse_core::protocol::{ChatPayload, Envelope, PresenceStatus};
use forumpulse_core::{ConversationId, UserId};

use crate::config::DeliveryPolicy;
use crate::directory::{ConversationDirectory, SessionValidator};
use crate::obs::HubMetrics;

/// Runtime knobs the hub needs from config.
#[derive(Debug, Clone, Copy)]
pub struct HubSettings {
    pub outbound_queue_depth: usize,
    pub delivery: DeliveryPolicy,
}

/// Composition root for the realtime layer.
///
/// Owns the registry, presence tracker, message router, and typing relay;
/// constructed once per process and passed explicitly; there is no ambient
/// global connection map. The registry itself stays a pure concurrent map:
/// validator I/O and presence fan-out happen here, never under a map guard.
pub struct Hub {
    settings: HubSettings,
    registry: Arc<ConnectionRegistry>,
    presence: Arc<PresenceTracker>,
    router: Arc<MessageRouter>,
    typing: Arc<TypingRelay>,
    validator: Arc<dyn SessionValidator>,
    directory: Arc<dyn ConversationDirectory>,
    metrics: Arc<HubMetrics>,
}

impl Hub {
    pub fn new(
        settings: HubSettings,
        validator: Arc<dyn SessionValidator>,
        directory: Arc<dyn ConversationDirectory>,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Arc::new(PresenceTracker::new());
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&directory),
            Arc::clone(&metrics),
        ));
        let typing = Arc::new(TypingRelay::new(
            Arc::clone(&router),
            Arc::clone(&directory),
        ));
        Self {
            settings,
            registry,
            presence,
            router,
            typing,
            validator,
            directory,
            metrics,
        }
    }

    /// Resolve a session token without touching hub state. Used by the
    /// transport to reject the upgrade handshake early.
    pub async fn authenticate(&self, token: &str) -> Result<UserId> {
        self.validator.validate(token).await
    }

    /// Authenticate and register a live connection.
    ///
    /// On success the user is reachable through the registry, and, if this
    /// was the user's first connection, the other connected users receive
    /// `online_status{online}` and `user_joined`. On an invalid token no
    /// state is mutated.
    pub async fn register(
        &self,
        token: &str,
    ) -> Result<(Arc<Connection>, mpsc::Receiver<Message>)> {
        let user_id = self.validator.validate(token).await?;

        if self.settings.delivery == DeliveryPolicy::SingleActive {
            while let Some(victim) = self.registry.evict_oldest(user_id) {
                tracing::info!(
                    user = user_id,
                    victim = victim.id(),
                    "single_active: evicting prior connection"
                );
                victim.close();
                self.metrics.connection_closed();
            }
        }

        let (conn, rx) =
            Connection::open(self.registry.next_id(), user_id, self.settings.outbound_queue_depth);
        self.registry.insert(Arc::clone(&conn));
        self.metrics.connection_opened();
        tracing::info!(user = user_id, conn = conn.id(), "connection registered");

        if self.presence.mark_online(user_id) {
            let status = Envelope::online_status(user_id, PresenceStatus::Online);
            let _ = self.router.broadcast_envelope(&status, Some(user_id));
            let joined = Envelope::user_joined(user_id);
            let _ = self.router.broadcast_envelope(&joined, Some(user_id));
        }

        Ok((conn, rx))
    }

    /// Remove a connection. Idempotent: unregistering twice is a no-op.
    ///
    /// Closing the connection first makes enqueue-after-remove impossible;
    /// when the user's last connection goes away the other connected users
    /// receive `online_status{offline}` and `user_left`.
    pub fn unregister(&self, conn: &Arc<Connection>) {
        conn.close();
        let user_id = conn.user_id();
        if self.registry.remove(user_id, conn.id()).is_none() {
            return;
        }
        self.metrics.connection_closed();
        tracing::info!(user = user_id, conn = conn.id(), "connection removed");

        if !self.registry.is_user_connected(user_id) && self.presence.mark_offline(user_id) {
            let status = Envelope::online_status(user_id, PresenceStatus::Offline);
            let _ = self.router.broadcast_envelope(&status, Some(user_id));
            let left = Envelope::user_left(user_id);
            let _ = self.router.broadcast_envelope(&left, Some(user_id));
        }
    }

    /// Fan a `conversation_update` out to every participant of the
    /// conversation. Entry point for the surrounding forum application when
    /// membership or metadata changes.
    pub async fn announce_conversation_update(
        &self,
        conversation: ConversationId,
        body: Map<String, Value>,
    ) -> Result<usize> {
        let participants = self.directory.participants(conversation).await?;
        let env = Envelope::ConversationUpdate(ChatPayload {
            conversation_id: Some(conversation),
            ..ChatPayload::from_body(body)
        });
        self.router.fan_out_to_users(&participants, &env)
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn typing(&self) -> &TypingRelay {
        &self.typing
    }
}
