//! Application entry point — Chord Listener.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (default on first run, written back so
//!    the file can be edited), and validate it.
//! 3. Build a [`ChordSession`] over the configured microphone.
//! 4. Run [`eframe::run_native`]; it blocks the main thread until the window
//!    is closed.

use chord_listener::{
    app::ChordApp,
    audio::{list_input_devices, MicrophoneSource},
    config::AppConfig,
    session::ChordSession,
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn load_config() -> AppConfig {
    let first_run = AppConfig::is_first_run();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            log::warn!("Invalid config ({e}); using defaults");
            AppConfig::default()
        }
    };

    if first_run {
        match config.save() {
            Ok(()) => log::info!("Wrote default settings.toml"),
            Err(e) => log::warn!("Could not write default settings ({e})"),
        }
    }
    config
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Chord Listener")
        .with_inner_size([360.0, 420.0])
        .with_min_inner_size([280.0, 240.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Chord Listener starting up");

    // 2. Configuration
    let config = load_config();

    match list_input_devices() {
        Ok(devices) => log::debug!("input devices: {devices:?}"),
        Err(e) => log::warn!("Could not enumerate input devices: {e}"),
    }

    // 3. Session over the configured microphone
    let source = MicrophoneSource::new(config.audio.input_device.clone());
    let session = ChordSession::new(source, config.clone());

    // 4. Build the egui app and run it (blocks until the window is closed)
    let app = ChordApp::new(session);
    let options = native_options(&config);

    eframe::run_native(
        "Chord Listener",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
