//! Configuration management for mosaicsh
//!
//! Session spawning and history listing settings, loadable from TOML or
//! JSON. Every section is `#[serde(default)]` so a partial file only
//! overrides what it names.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub use loader::{ConfigFormat, ConfigLoader};

/// Main configuration structure for mosaicsh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Child process configuration
    pub session: SessionConfig,

    /// History configuration
    pub history: HistoryConfig,
}

/// How external commands are launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shell that receives every external command via `-c`
    pub shell_path: PathBuf,

    /// Environment variables set on top of the inherited environment
    pub environment: BTreeMap<String, String>,

    /// Whether to inherit the parent environment
    pub inherit_env: bool,

    /// Pseudo-terminal rows
    pub rows: u16,

    /// Pseudo-terminal columns
    pub cols: u16,

    /// Size of each read from the pseudo-terminal master
    pub read_buffer_size: usize,

    /// Grace period for trailing output and stderr after the child exits
    pub output_drain_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("TERM".to_string(), "xterm-256color".to_string());
        environment.insert("CLICOLOR".to_string(), "1".to_string());

        Self {
            shell_path: PathBuf::from("/bin/sh"),
            environment,
            inherit_env: true,
            rows: 24,
            cols: 80,
            read_buffer_size: 4096,
            output_drain_ms: 500,
        }
    }
}

/// History listing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries reported by `history` with no arguments
    pub listing_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { listing_limit: 16 }
    }
}

impl Config {
    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.session.shell_path.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "session.shell_path".to_string(),
                reason: "Shell path cannot be empty".to_string(),
            });
        }

        if self.session.rows == 0 || self.session.cols == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "session.rows/cols".to_string(),
                reason: "Terminal dimensions must be greater than 0".to_string(),
            });
        }

        if self.session.read_buffer_size == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "session.read_buffer_size".to_string(),
                reason: "Read buffer size must be greater than 0".to_string(),
            });
        }

        if self.session.read_buffer_size > 1024 * 1024 {
            return Err(Error::ConfigValidationFailed {
                field: "session.read_buffer_size".to_string(),
                reason: "Read buffer size cannot exceed 1MB".to_string(),
            });
        }

        if self.session.output_drain_ms > 60_000 {
            return Err(Error::ConfigValidationFailed {
                field: "session.output_drain_ms".to_string(),
                reason: "Drain period cannot exceed 60 seconds".to_string(),
            });
        }

        if self.history.listing_limit == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "history.listing_limit".to_string(),
                reason: "Listing limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
