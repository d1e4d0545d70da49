//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to the session
//! worker by value. Every section is `#[serde(default)]`, so a file that
//! names only a few keys still loads.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::features::{
    DEFAULT_MAX_FREQUENCY_HZ, DEFAULT_MIN_FREQUENCY_HZ, DEFAULT_WINDOW_SIZE,
};
use crate::audio::gate::DEFAULT_SILENCE_FLOOR;
use crate::chord::aggregator::DEFAULT_WINDOW_FRAMES;
use crate::chord::matcher::DEFAULT_ACCEPTANCE_FLOOR;
use crate::chord::stability::{DEFAULT_COOLDOWN_SECS, DEFAULT_STABILITY_FRAMES};

use super::AppPaths;

/// Smallest analysis window accepted by [`AppConfig::validate`].
pub const MIN_ANALYSIS_WINDOW: usize = 256;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A setting outside its legal range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },

    #[error("detection.reacceptance_cooldown_secs must be >= 0, got {0}")]
    NegativeCooldown(f64),

    #[error("audio.min_frequency_hz ({min}) must be below audio.max_frequency_hz ({max})")]
    FrequencyRange { min: f32, max: f32 },
}

// ---------------------------------------------------------------------------
// DetectionConfig
// ---------------------------------------------------------------------------

/// Thresholds of the recognition pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Frames whose RMS falls below this are inaudible.
    pub silence_rms_floor: f32,
    /// Minimum cosine similarity for a template match to count.
    pub match_acceptance_floor: f32,
    /// Consecutive agreeing frames needed before a chord is confirmed.
    pub stability_frame_count: u32,
    /// Minimum gap in seconds before an unchanged chord is logged again.
    pub reacceptance_cooldown_secs: f64,
    /// Capacity of the chroma smoothing window, in frames.
    pub smoothing_window_frames: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            silence_rms_floor: DEFAULT_SILENCE_FLOOR,
            match_acceptance_floor: DEFAULT_ACCEPTANCE_FLOOR,
            stability_frame_count: DEFAULT_STABILITY_FRAMES,
            reacceptance_cooldown_secs: DEFAULT_COOLDOWN_SECS,
            smoothing_window_frames: DEFAULT_WINDOW_FRAMES,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Capture device and feature-extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Samples per analysis window (one feature frame each).
    pub analysis_window_size: usize,
    /// Lowest frequency that contributes to the chroma.
    pub min_frequency_hz: f32,
    /// Highest frequency that contributes to the chroma.
    pub max_frequency_hz: f32,
    /// Audio input device name; `None` means the system default.
    pub input_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            analysis_window_size: DEFAULT_WINDOW_SIZE,
            min_frequency_hz: DEFAULT_MIN_FREQUENCY_HZ,
            max_frequency_hz: DEFAULT_MAX_FREQUENCY_HZ,
            input_device: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window behaviour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Keep the window floating above all other windows.
    pub always_on_top: bool,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use chord_listener::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition thresholds.
    pub detection: DetectionConfig,
    /// Capture / analysis settings.
    pub audio: AudioConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }

    /// Check every threshold against its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        unit_range("detection.silence_rms_floor", d.silence_rms_floor)?;
        unit_range("detection.match_acceptance_floor", d.match_acceptance_floor)?;
        at_least(
            "detection.stability_frame_count",
            1,
            d.stability_frame_count as usize,
        )?;
        at_least(
            "detection.smoothing_window_frames",
            1,
            d.smoothing_window_frames,
        )?;
        if !(d.reacceptance_cooldown_secs >= 0.0) {
            return Err(ConfigError::NegativeCooldown(d.reacceptance_cooldown_secs));
        }

        let a = &self.audio;
        at_least(
            "audio.analysis_window_size",
            MIN_ANALYSIS_WINDOW,
            a.analysis_window_size,
        )?;
        if !(a.min_frequency_hz < a.max_frequency_hz) {
            return Err(ConfigError::FrequencyRange {
                min: a.min_frequency_hz,
                max: a.max_frequency_hz,
            });
        }
        Ok(())
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn at_least(field: &'static str, min: usize, value: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
