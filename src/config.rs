//! Session configuration.
//!
//! Every field has a default, so an empty document (or no file at all) is a
//! valid configuration:
//!
//! ```toml
//! device = "SpaceMouse Compact"
//! read_timeout_ms = 100
//! report_len = 64
//! queue_capacity = 64
//! log_level = "info"
//! ```

use crate::error::{Result, SpaceMouseError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Preferred device name; `None` picks the first connected match.
    #[serde(default)]
    pub device: Option<String>,
    /// Timeout for each poller read. Also bounds how long `stop()` can take.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: i32,
    /// Read buffer size. Must cover the longest report of the device.
    #[serde(default = "default_report_len")]
    pub report_len: usize,
    /// Bound of each pull queue returned by `subscribe()`.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// `tracing` filter directive used by the demo binaries.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Poller read timeout when none (or a non-positive one) is configured.
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 100;

fn default_read_timeout_ms() -> i32 {
    DEFAULT_READ_TIMEOUT_MS
}
fn default_report_len() -> usize {
    64
}
fn default_queue_capacity() -> usize {
    64
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: None,
            read_timeout_ms: default_read_timeout_ms(),
            report_len: default_report_len(),
            queue_capacity: default_queue_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SpaceMouseError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_timeout_ms <= 0 {
            return Err(SpaceMouseError::Config(format!(
                "read_timeout_ms must be positive, got {}",
                self.read_timeout_ms
            )));
        }
        if self.report_len < 2 {
            return Err(SpaceMouseError::Config(format!(
                "report_len must be at least 2, got {}",
                self.report_len
            )));
        }
        if self.queue_capacity == 0 {
            return Err(SpaceMouseError::Config(
                "queue_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
