//! Configuration management for playback and reporting
//!
//! This module provides runtime configuration loading from JSON files so
//! tone rendering and telemetry buffers can be adjusted without
//! recompilation. The search itself (start level, step sizes, frequency
//! order) is fixed and not configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the JSON config file
pub const DEFAULT_CONFIG_PATH: &str = "assets/hearing_config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Tone rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Tone length in milliseconds
    pub tone_duration_ms: u32,
    /// Linear fade in/out length in milliseconds, avoids onset clicks
    pub ramp_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            tone_duration_ms: crate::audiometry::TONE_DURATION_MS,
            ramp_ms: 10,
        }
    }
}

/// Session event buffering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Events retained in the session history
    pub history_capacity: usize,
    /// Broadcast channel capacity for live subscribers
    pub channel_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            history_capacity: 128,
            channel_capacity: 64,
        }
    }
}

/// Results report options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// List every frequency in the text summary, not only the averages
    pub include_per_frequency: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_per_frequency: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or the
    /// JSON is invalid (a warning is logged)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}
