//! Real-time chord recognition from microphone input.
//!
//! ```text
//! audio     capture, downmix, chroma features, silence gate
//! chord     templates, smoothing, matching, debouncing
//! session   start/stop lifecycle and the state the UI reads
//! config    settings.toml
//! app       egui window
//! ```

pub mod app;
pub mod audio;
pub mod chord;
pub mod config;
pub mod session;
