//! Configuration file for `cadence run` and friends.

use std::fs;
use std::path::Path;

use cadence_rt::RtSetup;
use cadence_sender::TcpSenderConfig;
use cadence_timers::{MAX_FREQUENCY_HZ, TimerStrategy};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const SCHEMA_VERSION: &str = "cadence.config/1";
pub const DEFAULT_FREQUENCY_HZ: u32 = 100;
pub const DEFAULT_PAYLOAD_BYTES: usize = 64 * 1024;
/// Largest tolerance accepted, one full second.
pub const MAX_TOLERANCE_MS: u32 = 1_000;

/// Generated payload sent every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    pub size_bytes: usize,
    /// Serve the payload from a temporary file through `sendfile`.
    pub zero_copy: bool,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            size_bytes: DEFAULT_PAYLOAD_BYTES,
            zero_copy: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub schema: String,
    pub frequency_hz: u32,
    pub tolerance_ms: u32,
    pub skip_mode: bool,
    pub timer: TimerStrategy,
    pub sender: TcpSenderConfig,
    pub rt: RtSetup,
    pub payload: PayloadConfig,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            schema: SCHEMA_VERSION.to_string(),
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            tolerance_ms: 0,
            skip_mode: false,
            timer: TimerStrategy::default(),
            sender: TcpSenderConfig::default(),
            rt: RtSetup::default(),
            payload: PayloadConfig::default(),
        }
    }
}

impl CadenceConfig {
    /// Load and validate a configuration file. The format follows the
    /// extension.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, unknown extensions, parse errors and
    /// invalid values.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let config = match extension.as_deref() {
            Some("json") => Self::from_json_str(&text)?,
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            _ => return Err(CliError::UnsupportedFormat(path.display().to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails when `text` is not a valid configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Fails when `text` is not a valid configuration document.
    pub fn from_yaml_str(text: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check every value the run would reject later.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.schema != SCHEMA_VERSION {
            return Err(CliError::InvalidConfiguration(format!(
                "unsupported schema {:?}, expected {SCHEMA_VERSION:?}",
                self.schema
            )));
        }
        if !(1..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(CliError::InvalidConfiguration(format!(
                "frequency_hz must be in 1..={MAX_FREQUENCY_HZ}, got {}",
                self.frequency_hz
            )));
        }
        if self.tolerance_ms > MAX_TOLERANCE_MS {
            return Err(CliError::InvalidConfiguration(format!(
                "tolerance_ms must be at most {MAX_TOLERANCE_MS}, got {}",
                self.tolerance_ms
            )));
        }
        if self.payload.size_bytes == 0 {
            return Err(CliError::InvalidConfiguration(
                "payload.size_bytes must be greater than zero".to_string(),
            ));
        }
        self.sender
            .validate()
            .map_err(|e| CliError::InvalidConfiguration(format!("sender: {e}")))
    }
}
