//! Session-scoped recognition pipeline.
//!
//! [`ChordPipeline`] owns every piece of per-session state (smoothing window,
//! matcher, stability tracker, session start time) and turns one
//! [`FeatureFrame`] at a time into status and log updates. A fresh pipeline
//! is built for every session, so nothing leaks between sessions.
//!
//! ```text
//! FeatureFrame ──rms < floor──▶ tracker.observe_silence()     (status unchanged)
//!              ──no chroma────▶ skipped                       (status unchanged)
//!              ──▶ aggregator.push ──▶ matcher.best_match ──▶ tracker.observe
//! ```

use crate::audio::{FeatureFrame, SilenceGate};
use crate::chord::{ChordEvent, ChordMatcher, ChromaAggregator, StabilityTracker, TrackerOutput};
use crate::config::DetectionConfig;

use super::state::SessionStatus;

// ---------------------------------------------------------------------------
// FrameOutcome
// ---------------------------------------------------------------------------

/// What one frame changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutcome {
    /// New status line, or `None` to leave it as is.
    pub status: Option<SessionStatus>,
    /// Chord to append to the log.
    pub event: Option<ChordEvent>,
}

impl FrameOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            event: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ChordPipeline
// ---------------------------------------------------------------------------

/// Aggregator → matcher → tracker for one capture session.
pub struct ChordPipeline {
    gate: SilenceGate,
    aggregator: ChromaAggregator,
    matcher: ChordMatcher,
    tracker: StabilityTracker,
    /// Audio-clock time the session started at.
    start_secs: f64,
}

impl ChordPipeline {
    /// Build a pipeline whose elapsed times are measured from `start_secs`.
    pub fn new(detection: &DetectionConfig, start_secs: f64) -> Self {
        Self {
            gate: SilenceGate::new(detection.silence_rms_floor),
            aggregator: ChromaAggregator::new(detection.smoothing_window_frames.max(1)),
            matcher: ChordMatcher::new(detection.match_acceptance_floor),
            tracker: StabilityTracker::new(
                detection.stability_frame_count,
                detection.reacceptance_cooldown_secs,
            ),
            start_secs,
        }
    }

    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    pub fn buffered_frames(&self) -> usize {
        self.aggregator.len()
    }

    /// Feed one frame, in capture order.
    pub fn process(&mut self, frame: &FeatureFrame) -> FrameOutcome {
        if self.gate.is_silent(frame.rms) {
            self.tracker.observe_silence();
            return FrameOutcome::unchanged();
        }
        let Some(chroma) = frame.chroma else {
            return FrameOutcome::unchanged();
        };

        self.aggregator.push(chroma);
        let average = self.aggregator.average();
        let result = self.matcher.best_match(average.as_ref());
        let elapsed = (frame.timestamp_secs - self.start_secs).max(0.0);

        match self.tracker.observe(&result, elapsed) {
            TrackerOutput::Silenced | TrackerOutput::NewCandidate { .. } => {
                FrameOutcome::unchanged()
            }
            TrackerOutput::NoMatch => FrameOutcome::status(SessionStatus::Listening),
            TrackerOutput::Tentative { name } => {
                log::debug!("pipeline: tentative {name} at {elapsed:.2}s");
                FrameOutcome::status(SessionStatus::Tentative(name))
            }
            TrackerOutput::Accepted(event) => {
                log::info!("chord {} at {:.1}s", event.name, event.elapsed_secs);
                FrameOutcome {
                    status: Some(SessionStatus::Confirmed(event.name.clone())),
                    event: Some(event),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
