//! # Storage Configuration
//!
//! Engine configuration with defaults, builder methods and TOML loading.
//!
//! ## Config File Format
//!
//! ```toml
//! [s4]
//! max_payload_size_bytes = 5120
//! max_slots_per_user = 10
//! sweep_interval_ms = 1000
//! ```
//!
//! Missing keys fall back to [`S4Config::default`].

use crate::domain::entities::Constraints;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default maximum payload size (5 KiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE_BYTES: usize = 5 * 1024;

/// Default number of slots per address.
pub const DEFAULT_MAX_SLOTS_PER_USER: u32 = 10;

/// Default interval between expiration sweeps.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Configuration for the S4 storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct S4Config {
    /// Maximum payload size in bytes.
    pub max_payload_size_bytes: usize,

    /// Slots per address. Must be non-zero.
    pub max_slots_per_user: u32,

    /// Interval between background expiration sweeps (in-memory backend).
    pub sweep_interval_ms: u64,
}

impl Default for S4Config {
    fn default() -> Self {
        Self {
            max_payload_size_bytes: DEFAULT_MAX_PAYLOAD_SIZE_BYTES,
            max_slots_per_user: DEFAULT_MAX_SLOTS_PER_USER,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    s4: S4Config,
}

impl S4Config {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum payload size.
    pub fn with_max_payload_size(mut self, bytes: usize) -> Self {
        self.max_payload_size_bytes = bytes;
        self
    }

    /// Set the number of slots per address.
    pub fn with_max_slots_per_user(mut self, slots: u32) -> Self {
        self.max_slots_per_user = slots;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Sweep interval as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slots_per_user == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }

    /// Validated constraints derived from this configuration.
    pub fn constraints(&self) -> Result<Constraints, ConfigError> {
        self.validate()?;
        Ok(Constraints {
            max_payload_size_bytes: self.max_payload_size_bytes,
            max_slots_per_user: self.max_slots_per_user,
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        file.s4.validate()?;
        Ok(file.s4)
    }
}
