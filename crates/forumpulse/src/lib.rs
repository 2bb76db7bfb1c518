//! Top-level facade crate for forumpulse.
//!
//! Re-exports core types and the hub library so users can depend on a single crate.

pub mod core {
    pub use forumpulse_core::*;
}

pub mod hub {
    pub use forumpulse_hub::*;
}
