//! Client configuration.
//!
//! Defaults match the production backend contract; the CLI overrides them
//! from command-line flags.

use std::time::Duration;

pub use crate::domain::ReconnectConfig;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_WS_BASE_URL: &str = "ws://127.0.0.1:8000/ws/chat";
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Shorter heartbeat intervals (including zero) are raised to this
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10);

/// REST backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_base_url: String,
    /// Bearer token of the signed-in user; `None` means unauthenticated
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
        }
    }
}

/// Real-time connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base of the transport URL; `/<thread_id>/?token=...` is appended
    pub ws_base_url: String,
    /// Period of the `ping` frame while connected
    pub heartbeat_interval: Duration,
    pub reconnect: ReconnectConfig,
}

impl ConnectionConfig {
    /// Heartbeat period actually used; never zero
    pub fn heartbeat_period(&self) -> Duration {
        self.heartbeat_interval.max(MIN_HEARTBEAT_INTERVAL)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reconnect: ReconnectConfig::default(),
        }
    }
}
