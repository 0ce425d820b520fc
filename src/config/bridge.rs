//! Bridge configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::pusher::ChannelName;

/// Bridge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Application key handed to the messaging client on connect
    #[serde(default)]
    pub app_key: String,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Channels to subscribe on startup (comma-separated)
    pub channels: Option<String>,

    /// Events to bind on every startup channel (comma-separated)
    #[serde(default = "default_events")]
    pub events: String,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl BridgeConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get startup channels as a vector
    pub fn channels_list(&self) -> Vec<String> {
        self.channels
            .as_ref()
            .map(|s| split_list(s))
            .unwrap_or_default()
    }

    /// Get startup events as a vector
    pub fn events_list(&self) -> Vec<String> {
        split_list(&self.events)
    }

    /// Validate bridge configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BRIDGE_APP_KEY"));
        }
        for channel in self.channels_list() {
            if ChannelName::parse(&channel).is_err() {
                return Err(ValidationError::InvalidChannel(channel));
            }
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            environment: default_environment(),
            log_level: default_log_level(),
            channels: None,
            events: default_events(),
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,pusher_bridge=debug".to_string()
}

fn default_events() -> String {
    "message".to_string()
}
