//! Presence tracker: online/offline derived from registry membership.

use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use forumpulse_core::protocol::{PresenceRecord, PresenceStatus};
use forumpulse_core::UserId;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Per-user presence snapshot with transition dedupe.
///
/// `mark_online` / `mark_offline` return `true` only on a real transition, so
/// a second connection for an already-online user produces no notification.
/// Records are kept after disconnect for last-seen semantics.
#[derive(Default)]
pub struct PresenceTracker {
    records: DashMap<UserId, PresenceRecord>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn mark_online(&self, user_id: UserId) -> bool {
        self.transition(user_id, PresenceStatus::Online)
    }

    pub fn mark_offline(&self, user_id: UserId) -> bool {
        self.transition(user_id, PresenceStatus::Offline)
    }

    fn transition(&self, user_id: UserId, status: PresenceStatus) -> bool {
        let mut transitioned = false;
        self.records
            .entry(user_id)
            .and_modify(|r| {
                if r.status != status {
                    r.status = status;
                    r.last_seen_ms = now_ms();
                    transitioned = true;
                }
            })
            .or_insert_with(|| {
                // First sighting of this user; only Online counts as a
                // transition (everyone starts implicitly offline).
                transitioned = status == PresenceStatus::Online;
                PresenceRecord {
                    status,
                    last_seen_ms: now_ms(),
                }
            });
        transitioned
    }

    pub fn status(&self, user_id: UserId) -> PresenceStatus {
        self.records
            .get(&user_id)
            .map(|r| r.status)
            .unwrap_or(PresenceStatus::Offline)
    }

    pub fn last_seen_ms(&self, user_id: UserId) -> Option<u64> {
        self.records.get(&user_id).map(|r| r.last_seen_ms)
    }

    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .records
            .iter()
            .filter(|e| e.value().status == PresenceStatus::Online)
            .map(|e| *e.key())
            .collect();
        users.sort_unstable();
        users
    }
}
