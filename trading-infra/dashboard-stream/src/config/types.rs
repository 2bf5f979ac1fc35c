use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::SubscriptionRequest;

/// Root configuration for the dashboard-stream binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfigFile {
    #[serde(default)]
    pub stream: StreamConfig,
    /// Subscriptions opened at startup
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionConfig>,
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Reconnect after an unintentional close
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// Fixed delay before each reconnect attempt
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Capacity of the inbound event queue per connection
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            url: default_url(),
            reconnect: default_true(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            inbound_buffer: default_inbound_buffer(),
        }
    }
}

impl StreamConfig {
    /// Default settings pointed at the stream port of `host`
    pub fn for_host(host: &str) -> Self {
        StreamConfig {
            url: format!("ws://{host}:8001/ws"),
            ..Default::default()
        }
    }

    pub fn with_reconnect(mut self, enabled: bool) -> Self {
        self.reconnect = enabled;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// A named startup subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub name: String,
    #[serde(flatten)]
    pub request: SubscriptionRequest,
}

fn default_url() -> String {
    "ws://localhost:8001/ws".to_string()
}

fn default_true() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_inbound_buffer() -> usize {
    1024
}
