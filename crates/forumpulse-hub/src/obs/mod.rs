//! Observability: hub metrics registry.

pub mod metrics;

pub use metrics::HubMetrics;
