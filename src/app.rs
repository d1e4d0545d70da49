//! Chord listener window — egui/eframe application.
//!
//! # Architecture
//!
//! [`ChordApp`] is the top-level [`eframe::App`]. It owns the
//! [`ChordSession`] and reads the session's [`SharedState`] every frame; the
//! worker thread is the only writer of status and log while a session runs.
//!
//! # Layout
//!
//! | Row | Content |
//! |-----|---------|
//! | Title | "Chord Listener" + Start/Stop Listening button |
//! | Status | `Waiting...`, `Listening...`, `...G Major`, `G Major`, `Stopped.` or the error |
//! | Log | One `"<name>  <elapsed>s"` row per accepted chord, newest at the bottom |

use std::time::Duration;

use eframe::egui;

use crate::chord::ChordEvent;
use crate::session::{lock, ChordSession, SessionStatus, SharedState};

/// Repaint interval while a session is live (~20 fps).
const LIVE_REPAINT: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// One row of the chord log.
pub fn format_event(event: &ChordEvent) -> String {
    format!("{}  {:.1}s", event.name, event.elapsed_secs)
}

/// Caption of the start/stop button.
pub fn toggle_label(listening: bool) -> &'static str {
    if listening {
        "Stop Listening"
    } else {
        "Start Listening"
    }
}

fn status_color(status: &SessionStatus) -> egui::Color32 {
    match status {
        SessionStatus::Waiting | SessionStatus::Stopped => egui::Color32::from_rgb(140, 140, 140),
        SessionStatus::Listening => egui::Color32::from_rgb(68, 136, 255),
        SessionStatus::Tentative(_) => egui::Color32::from_rgb(200, 200, 120),
        SessionStatus::Confirmed(_) => egui::Color32::from_rgb(80, 200, 120),
        SessionStatus::Error(_) => egui::Color32::from_rgb(255, 136, 68),
    }
}

// ---------------------------------------------------------------------------
// ChordApp
// ---------------------------------------------------------------------------

pub struct ChordApp {
    session: ChordSession,
    state: SharedState,
}

impl ChordApp {
    pub fn new(session: ChordSession) -> Self {
        let state = session.state();
        Self { session, state }
    }

    fn toggle(&mut self) {
        if self.session.is_listening() {
            self.session.stop();
        } else if let Err(e) = self.session.start() {
            // The status line already carries the user-facing message.
            log::warn!("could not start listening: {e}");
        }
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Chord Listener")
                    .color(egui::Color32::from_rgb(200, 200, 200))
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = toggle_label(self.session.is_listening());
                if ui.button(label).clicked() {
                    self.toggle();
                }
            });
        });
    }

    fn draw_status(&self, ui: &mut egui::Ui, status: &SessionStatus) {
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(status.display_text())
                    .color(status_color(status))
                    .size(28.0),
            );
        });
    }

    fn draw_log(&self, ui: &mut egui::Ui, events: &[ChordEvent]) {
        ui.label(
            egui::RichText::new("Detected chords")
                .color(egui::Color32::from_rgb(180, 180, 180))
                .size(12.0),
        );
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if events.is_empty() {
                    ui.label(
                        egui::RichText::new("None yet")
                            .color(egui::Color32::from_rgb(120, 120, 120))
                            .italics(),
                    );
                }
                for event in events {
                    ui.monospace(format_event(event));
                }
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ChordApp {
    /// Called every frame by eframe. Snapshots the shared state, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Copy out under a brief lock; the worker must not wait on rendering.
        let (status, events) = {
            let state = lock(&self.state);
            (state.status.clone(), state.events.clone())
        };

        if self.session.is_listening() {
            ctx.request_repaint_after(LIVE_REPAINT);
        }

        let frame = egui::Frame::new()
            .fill(egui::Color32::from_rgb(30, 30, 30))
            .inner_margin(egui::Margin::same(12));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_header(ui);
            ui.separator();
            self.draw_status(ui, &status);
            ui.separator();
            self.draw_log(ui, &events);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.stop();
        log::info!("chord listener closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_row_has_one_decimal() {
        let event = ChordEvent {
            name: "F# Minor".into(),
            elapsed_secs: 12.345,
        };
        assert_eq!(format_event(&event), "F# Minor  12.3s");
    }

    #[test]
    fn event_row_at_session_start() {
        let event = ChordEvent {
            name: "C Major".into(),
            elapsed_secs: 0.0,
        };
        assert_eq!(format_event(&event), "C Major  0.0s");
    }

    #[test]
    fn toggle_caption_follows_listening() {
        assert_eq!(toggle_label(false), "Start Listening");
        assert_eq!(toggle_label(true), "Stop Listening");
    }

    #[test]
    fn error_and_confirmed_colours_differ() {
        assert_ne!(
            status_color(&SessionStatus::Error("x".into())),
            status_color(&SessionStatus::Confirmed("x".into()))
        );
    }
}
