//! One authenticated live channel to a user.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use forumpulse_core::error::{HubError, Result};
use forumpulse_core::UserId;

/// Registry-scoped connection identity, monotonic per hub instance.
pub type ConnectionId = u64;

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// A live connection: bounded outbound queue plus lifecycle state.
///
/// Lifecycle is `Open -> Closing -> Closed`. `Closing` stops new enqueues
/// while the session task drains what is already queued; `Closed` is
/// terminal. The state word is the only coordination between the router
/// (enqueuing) and the session task (draining), so no lock is ever held
/// across delivery I/O.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    tx: mpsc::Sender<Message>,
    state: AtomicU8,
    last_activity: Mutex<Instant>,
}

impl Connection {
    /// Create an open connection with a bounded outbound queue.
    /// The receiver half belongs to the session task that owns the socket.
    pub fn open(
        id: ConnectionId,
        user_id: UserId,
        queue_depth: usize,
    ) -> (std::sync::Arc<Self>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(queue_depth);
        let conn = std::sync::Arc::new(Self {
            id,
            user_id,
            tx,
            state: AtomicU8::new(STATE_OPEN),
            last_activity: Mutex::new(Instant::now()),
        });
        (conn, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Enqueue an outbound frame. Never blocks the caller.
    ///
    /// Returns `ConnectionClosed` once the connection has left `Open`, and
    /// `QueueOverflow` when the bounded queue is full; the caller decides
    /// what overflow means (the router closes the connection).
    pub fn send(&self, msg: Message) -> Result<()> {
        if self.state.load(Ordering::Acquire) != STATE_OPEN {
            return Err(HubError::ConnectionClosed);
        }
        match self.tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(HubError::QueueOverflow),
            Err(TrySendError::Closed(_)) => {
                self.state.store(STATE_CLOSED, Ordering::Release);
                Err(HubError::ConnectionClosed)
            }
        }
    }

    /// Move to `Closing`. Idempotent and safe to call from any task; queued
    /// frames are still drained best-effort by the session task.
    pub fn close(&self) {
        let _ = self.state.compare_exchange(
            STATE_OPEN,
            STATE_CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Terminal transition, called by the session task once the drain is done.
    pub(crate) fn mark_closed(&self) {
        self.state.store(STATE_CLOSED, Ordering::Release);
    }

    /// True only while `Open`.
    pub fn is_connected(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_OPEN
    }

    /// Record inbound traffic for idle-timeout accounting.
    pub fn touch(&self) {
        if let Ok(mut t) = self.last_activity.lock() {
            *t = Instant::now();
        }
    }

    /// Time since the last inbound frame.
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }
}
