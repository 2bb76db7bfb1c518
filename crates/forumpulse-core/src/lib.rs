//! forumpulse core: protocol primitives and error types for the realtime hub.
//!
//! This crate defines the envelope wire contract and the error surface shared
//! by the hub, its transport layer, and test tooling. It intentionally carries
//! no transport or runtime dependencies so it can be reused in multiple
//! contexts (the hub binary, fixtures, client tooling).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `HubError`/`Result` so production
//! processes do not crash on malformed input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{HubError, Result};
pub use protocol::{ConversationId, UserId};
