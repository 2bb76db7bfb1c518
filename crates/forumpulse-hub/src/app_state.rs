//! Shared application state for the forumpulse hub.

use std::sync::Arc;

use crate::config::HubConfig;
use crate::directory::{ConversationDirectory, SessionValidator};
use crate::hub::{Hub, HubSettings};
use crate::obs::HubMetrics;

/// Cloneable handle to the process-wide state: config, the hub composition
/// root, and the metrics registry. Constructed once in `main` (or a test) and
/// handed to the axum router; there is no other way to reach the hub.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: HubConfig,
    hub: Hub,
    metrics: Arc<HubMetrics>,
}

impl AppState {
    pub fn new(
        cfg: HubConfig,
        validator: Arc<dyn SessionValidator>,
        directory: Arc<dyn ConversationDirectory>,
    ) -> Self {
        let metrics = Arc::new(HubMetrics::new());
        let settings = HubSettings {
            outbound_queue_depth: cfg.hub.outbound_queue_depth,
            delivery: cfg.hub.delivery,
        };
        let hub = Hub::new(settings, validator, directory, Arc::clone(&metrics));
        Self {
            inner: Arc::new(AppStateInner { cfg, hub, metrics }),
        }
    }

    pub fn cfg(&self) -> &HubConfig {
        &self.inner.cfg
    }

    pub fn hub(&self) -> &Hub {
        &self.inner.hub
    }

    pub fn metrics(&self) -> &HubMetrics {
        &self.inner.metrics
    }
}
