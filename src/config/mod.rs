//! Configuration for the chord listener.
//!
//! Provides `AppConfig` (top-level settings) with its detection, audio and UI
//! sections, `AppPaths` for the platform config directory, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig, ConfigError, DetectionConfig, UiConfig};
