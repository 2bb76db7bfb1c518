//! Presence wire types.

use serde::{Deserialize, Serialize};

use crate::protocol::UserId;

/// A user's derived online/offline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Payload for `online_status` envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnlineStatusPayload {
    pub user_id: UserId,
    pub status: PresenceStatus,
}

/// Current presence snapshot for one user.
///
/// One record per user id, created on first connect and updated on every
/// transition; records are never deleted so `last_seen` survives disconnects.
/// Durable storage is external; this is only the in-memory view the hub
/// needs to deduplicate notifications.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceRecord {
    pub status: PresenceStatus,
    /// Unix timestamp in milliseconds of the last status transition.
    pub last_seen_ms: u64,
}
