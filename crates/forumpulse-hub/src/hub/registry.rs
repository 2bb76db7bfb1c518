//! Connection registry: the authoritative map of who is reachable now.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};

use forumpulse_core::UserId;

use crate::hub::connection::{Connection, ConnectionId};

/// Concurrency-safe registry:
/// - `connection_id -> Connection`
/// - `user_id -> {connection_id...}`
///
/// Pure bookkeeping: no validation, no presence, no delivery I/O. Fan-out
/// always works against a snapshot or an owned `Connection` handle, never
/// while iterating a map guard.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<Connection>>,
    user_index: DashMap<UserId, DashSet<ConnectionId>>,
    seq: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_index: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Allocate the next connection id. Ids are monotonic, so the oldest
    /// connection for a user is the one with the smallest id.
    pub fn next_id(&self) -> ConnectionId {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert(&self, conn: Arc<Connection>) {
        self.user_index
            .entry(conn.user_id())
            .or_insert_with(DashSet::new)
            .insert(conn.id());
        self.connections.insert(conn.id(), conn);
    }

    /// Remove one connection. Idempotent: removing an unknown id is a no-op.
    pub fn remove(&self, user_id: UserId, conn_id: ConnectionId) -> Option<Arc<Connection>> {
        if let Some(set) = self.user_index.get(&user_id) {
            set.remove(&conn_id);
            if set.is_empty() {
                drop(set);
                self.user_index.remove(&user_id);
            }
        }
        self.connections.remove(&conn_id).map(|(_, conn)| conn)
    }

    /// Non-mutating read: every open connection for a user, empty if offline.
    pub fn connections_for(&self, user_id: UserId) -> Vec<Arc<Connection>> {
        let Some(set) = self.user_index.get(&user_id) else {
            return vec![];
        };
        set.iter()
            .filter_map(|id| self.connections.get(&id).map(|e| Arc::clone(e.value())))
            .collect()
    }

    pub fn is_user_connected(&self, user_id: UserId) -> bool {
        self.user_index
            .get(&user_id)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.user_index.get(&user_id).map(|s| s.len()).unwrap_or(0)
    }

    /// Stable point-in-time copy of all registered connections, ordered by
    /// connection id. Broadcast iterates this copy so delivery never holds a
    /// registry shard lock.
    pub fn snapshot_all(&self) -> Vec<Arc<Connection>> {
        let mut all: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        all.sort_by_key(|c| c.id());
        all
    }

    /// Remove and return the oldest connection for this user, if any.
    /// Used by the single-active delivery policy.
    pub fn evict_oldest(&self, user_id: UserId) -> Option<Arc<Connection>> {
        let set = self.user_index.get(&user_id)?;
        let victim = set.iter().map(|id| *id).min()?;
        drop(set);
        self.remove(user_id, victim)
    }
}
