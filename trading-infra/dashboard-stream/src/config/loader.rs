use std::path::Path;
use thiserror::Error;

use super::types::{StreamConfig, StreamConfigFile};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid stream url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Load stream configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StreamConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<StreamConfigFile, ConfigError> {
    let config: StreamConfigFile = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<StreamConfigFile, ConfigError> {
    let default_config = include_str!("stream_config.json");
    load_config_from_str(default_config)
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        if self.reconnect_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.inbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "inbound_buffer".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl StreamConfigFile {
    /// Get a startup subscription by name
    pub fn get_subscription(&self, name: &str) -> Option<&super::types::SubscriptionConfig> {
        self.subscriptions.iter().find(|s| s.name == name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stream.validate()?;
        for subscription in &self.subscriptions {
            if subscription.request.channels.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("subscriptions.{}.channels", subscription.name),
                    reason: "at least one channel is required".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Channel;

    #[test]
    fn test_load_default_config() {
        let config = load_default_config().unwrap();
        assert_eq!(config.stream.url, "ws://localhost:8001/ws");
        assert!(!config.subscriptions.is_empty());
    }

    #[test]
    fn test_get_subscription() {
        let config = load_default_config().unwrap();
        let prices = config.get_subscription("btc-prices").unwrap();
        assert_eq!(prices.request.channels, vec![Channel::PriceCandles]);
        assert_eq!(prices.request.history, Some(500));
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = load_config_from_str(r#"{"stream": {"url": "http://localhost/ws"}}"#);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));

        let result = load_config_from_str(r#"{"stream": {"url": "not a url"}}"#);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = load_config_from_str(r#"{"stream": {"reconnect_interval_ms": 0}}"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_rejects_empty_channels() {
        let result = load_config_from_str(r#"{"subscriptions": [{"name": "x", "channels": []}]}"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_channel_is_parse_error() {
        let result =
            load_config_from_str(r#"{"subscriptions": [{"name": "x", "channels": ["orderbook"]}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
