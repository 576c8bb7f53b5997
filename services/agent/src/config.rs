//! Configuration for the resync agent.

use anyhow::Result;
use lbsync_id::AgentId;

/// Resync agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unique identifier for this agent.
    pub agent_id: AgentId,

    /// Control plane API URL.
    pub control_plane_url: String,

    /// Appliance partition (namespace) this agent configures.
    pub partition: String,

    /// Resync interval in seconds.
    pub resync_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Number of in-memory mock devices to run against in dev.
    pub mock_fleet_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Agent ID can be provided or auto-generated
        let agent_id = std::env::var("LBSYNC_AGENT_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(AgentId::new);

        let control_plane_url = std::env::var("LBSYNC_CONTROL_PLANE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let partition =
            std::env::var("LBSYNC_PARTITION").unwrap_or_else(|_| "lbsync".to_string());

        let resync_interval_secs = std::env::var("LBSYNC_RESYNC_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let log_level = std::env::var("LBSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mock_fleet_size = std::env::var("LBSYNC_MOCK_FLEET_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        Ok(Self {
            agent_id,
            control_plane_url,
            partition,
            resync_interval_secs,
            log_level,
            mock_fleet_size,
        })
    }
}
