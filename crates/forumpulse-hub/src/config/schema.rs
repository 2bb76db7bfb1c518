use serde::Deserialize;

use forumpulse_core::error::{HubError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    pub version: u32,

    #[serde(default)]
    pub hub: HubSection,
}

impl HubConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HubError::BadRequest("unsupported config version".into()));
        }
        self.hub.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Bounded capacity of each connection's outbound queue. On overflow the
    /// connection is closed rather than buffering without limit.
    #[serde(default = "default_outbound_queue_depth")]
    pub outbound_queue_depth: usize,

    /// What a second registration for an already-connected user does.
    #[serde(default)]
    pub delivery: DeliveryPolicy,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue_depth: default_outbound_queue_depth(),
            delivery: DeliveryPolicy::default(),
        }
    }
}

impl HubSection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120_000).contains(&self.ping_interval_ms) {
            return Err(HubError::BadRequest(
                "hub.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10_000..=600_000).contains(&self.idle_timeout_ms) {
            return Err(HubError::BadRequest(
                "hub.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(HubError::BadRequest(
                "hub.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(16..=65_536).contains(&self.outbound_queue_depth) {
            return Err(HubError::BadRequest(
                "hub.outbound_queue_depth must be between 16 and 65536".into(),
            ));
        }
        Ok(())
    }
}

/// Policy for a user opening a second live connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Deliveries fan out to every open connection for the user.
    #[default]
    Multiplex,
    /// A new registration evicts the user's oldest connection.
    SingleActive,
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue_depth() -> usize {
    256
}
