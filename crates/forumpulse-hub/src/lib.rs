//! forumpulse hub library entry.
//!
//! This crate wires the WebSocket transport, connection registry, message
//! router, presence tracker, and typing relay into a cohesive realtime hub
//! for the surrounding forum application. It is intended to be consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod directory;
pub mod hub;
pub mod obs;
pub mod router;
pub mod transport;
