//! Message log configuration
//!
//! Loaded from TOML or built from one of the presets below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{MessageLogError, Result};

/// Configuration for the message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageLogConfig {
    /// Capacity of the change notification channel; slow subscribers lag past it
    pub notification_buffer_size: usize,
    /// Include message payloads in trace events
    pub trace_payloads: bool,
}

impl Default for MessageLogConfig {
    fn default() -> Self {
        Self {
            notification_buffer_size: 256,
            trace_payloads: false,
        }
    }
}

impl MessageLogConfig {
    /// Create configuration for low memory environments
    pub fn low_memory() -> Self {
        Self {
            notification_buffer_size: 32,
            trace_payloads: false,
        }
    }

    /// Create configuration for tests
    pub fn testing() -> Self {
        Self {
            notification_buffer_size: 64,
            trace_payloads: true,
        }
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.notification_buffer_size == 0 {
            return Err(MessageLogError::Config(
                "notification_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
