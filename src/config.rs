//! Configuration management with serde serialization/deserialization
//!
//! This module provides all configuration structures for the tools: file
//! intake limits, password defaults, simulated backend delays and recorder
//! settings. A configuration file is plain JSON; any section left out falls
//! back to its default.

use crate::password::CharsetFlags;
use crate::ToolError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for the tool collection
///
/// # Examples
///
/// ```rust
/// use toolbench::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Tighten the upload limits
/// let config = Config {
///     intake: toolbench::IntakeConfig {
///         max_files: 1,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Limits applied by the file dropzone
    pub intake: IntakeConfig,

    /// Defaults for the password generator
    pub password: PasswordDefaults,

    /// Delays and canned values for the simulated backends
    pub simulation: SimulationConfig,

    /// Screen recorder settings
    pub recorder: RecorderConfig,
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self, ToolError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ToolError> {
        if self.intake.accept.is_empty() {
            return Err(ToolError::ConfigurationError(
                "At least one accepted type pattern is required".to_string(),
            ));
        }

        if self.intake.max_files == 0 {
            return Err(ToolError::ConfigurationError(
                "Max files must be greater than 0".to_string(),
            ));
        }

        let (min, max) = (crate::MIN_PASSWORD_LENGTH, crate::MAX_PASSWORD_LENGTH);
        if !(min..=max).contains(&self.password.length) {
            return Err(ToolError::ConfigurationError(format!(
                "Default password length must be within {min}..={max}"
            )));
        }

        if self.simulation.short_url_base.is_empty() {
            return Err(ToolError::ConfigurationError(
                "Short URL base must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// File dropzone limits
///
/// # Examples
///
/// ```rust
/// use toolbench::IntakeConfig;
///
/// let images_only = IntakeConfig {
///     accept: vec!["image/*".to_string()],
///     max_size: 5 * 1024 * 1024,
///     max_files: 3,
/// };
/// assert_eq!(images_only.max_files, 3);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Accepted MIME patterns (default: `*/*`)
    ///
    /// A pattern is either an exact type such as `application/pdf` or a
    /// wildcard suffix such as `image/*`.
    pub accept: Vec<String>,

    /// Largest accepted file in bytes (default: 10 MiB)
    pub max_size: u64,

    /// Most files held at once (default: 10)
    pub max_files: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            accept: vec!["*/*".to_string()],
            max_size: 10 * 1024 * 1024,
            max_files: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordDefaults {
    /// Default length (default: 12)
    pub length: usize,

    /// Character classes enabled when none are given (default: all)
    pub charset: CharsetFlags,
}

impl Default for PasswordDefaults {
    fn default() -> Self {
        Self {
            length: 12,
            charset: CharsetFlags::all(),
        }
    }
}

/// Fixed delays standing in for network latency
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// URL shortener delay (default: 1 second)
    pub shorten_delay: Duration,

    /// Video lookup delay (default: 2 seconds)
    pub video_delay: Duration,

    /// Audio conversion delay (default: 3 seconds)
    pub convert_delay: Duration,

    /// Prefix for generated short links (default: `https://short.ly`)
    pub short_url_base: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shorten_delay: Duration::from_secs(1),
            video_delay: Duration::from_secs(2),
            convert_delay: Duration::from_secs(3),
            short_url_base: "https://short.ly".to_string(),
        }
    }
}

impl SimulationConfig {
    /// No delays, for tests and benchmarks.
    pub fn instant() -> Self {
        Self {
            shorten_delay: Duration::ZERO,
            video_delay: Duration::ZERO,
            convert_delay: Duration::ZERO,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Capture system audio alongside the display (default: true)
    pub include_audio: bool,

    /// Container type of the finished recording (default: `video/webm`)
    pub mime_type: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            include_audio: true,
            mime_type: "video/webm".to_string(),
        }
    }
}
