//! Debouncing state machine that turns per-frame matches into chord events.
//!
//! # Transitions
//!
//! ```text
//! any ──silent frame──────────────▶ NoCandidate          (Silenced)
//! any ──no match──────────────────▶ NoCandidate          (NoMatch)
//! NoCandidate ──match X───────────▶ Accumulating(X, 1)   (NewCandidate)
//! Accumulating(Y) ──match X≠Y─────▶ Accumulating(X, 1)   (NewCandidate)
//! Accumulating(X, n) ──match X────▶ Accumulating(X, n+1)
//!        n+1 ≥ required and (first acceptance, different chord,
//!        or cooldown elapsed)                            (Accepted)
//!        otherwise                                       (Tentative)
//! ```
//!
//! There is no terminal state; the tracker lives as long as a capture
//! session does.

use super::matcher::MatchResult;

/// Default number of consecutive agreeing frames required to confirm.
pub const DEFAULT_STABILITY_FRAMES: u32 = 5;
/// Default minimum gap before an unchanged chord is logged again.
pub const DEFAULT_COOLDOWN_SECS: f64 = 1.5;

// ---------------------------------------------------------------------------
// ChordEvent
// ---------------------------------------------------------------------------

/// A chord that survived debouncing and was appended to the session log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    pub name: String,
    /// Seconds since the capture session started.
    pub elapsed_secs: f64,
}

// ---------------------------------------------------------------------------
// StabilityState
// ---------------------------------------------------------------------------

/// Current state of the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityState {
    NoCandidate,
    Accumulating { name: String, score: f32, count: u32 },
}

/// What the tracker decided for one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerOutput {
    /// Frame was below the silence floor; the displayed chord stays as is.
    Silenced,
    /// No template cleared the floor; display reverts to "listening".
    NoMatch,
    /// A new leading candidate started accumulating.
    NewCandidate { name: String },
    /// The candidate is agreeing but not (re)confirmed yet.
    Tentative { name: String },
    /// The candidate was confirmed and should be logged.
    Accepted(ChordEvent),
}

// ---------------------------------------------------------------------------
// StabilityTracker
// ---------------------------------------------------------------------------

/// Debounces successive [`MatchResult`]s.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    required_frames: u32,
    cooldown_secs: f64,
    state: StabilityState,
    last_accepted: Option<ChordEvent>,
}

impl StabilityTracker {
    /// `required_frames` is clamped to at least 1.
    pub fn new(required_frames: u32, cooldown_secs: f64) -> Self {
        Self {
            required_frames: required_frames.max(1),
            cooldown_secs,
            state: StabilityState::NoCandidate,
            last_accepted: None,
        }
    }

    pub fn state(&self) -> &StabilityState {
        &self.state
    }

    /// Consecutive count of the current candidate; `0` with no candidate.
    pub fn count(&self) -> u32 {
        match &self.state {
            StabilityState::NoCandidate => 0,
            StabilityState::Accumulating { count, .. } => *count,
        }
    }

    pub fn last_accepted(&self) -> Option<&ChordEvent> {
        self.last_accepted.as_ref()
    }

    /// Forget the candidate and the last acceptance.
    pub fn reset(&mut self) {
        self.state = StabilityState::NoCandidate;
        self.last_accepted = None;
    }

    /// Handle a frame rejected by the silence gate.
    pub fn observe_silence(&mut self) -> TrackerOutput {
        self.state = StabilityState::NoCandidate;
        TrackerOutput::Silenced
    }

    /// Handle a match evaluated at `elapsed_secs` into the session.
    pub fn observe(&mut self, result: &MatchResult, elapsed_secs: f64) -> TrackerOutput {
        let Some(name) = result.name.as_deref() else {
            self.state = StabilityState::NoCandidate;
            return TrackerOutput::NoMatch;
        };

        let continued = match &mut self.state {
            StabilityState::Accumulating {
                name: current,
                count,
                ..
            } if current.as_str() == name => {
                *count += 1;
                Some(*count)
            }
            _ => None,
        };

        let Some(count) = continued else {
            self.state = StabilityState::Accumulating {
                name: name.to_owned(),
                score: result.score,
                count: 1,
            };
            return TrackerOutput::NewCandidate {
                name: name.to_owned(),
            };
        };

        if count >= self.required_frames && self.may_accept(name, elapsed_secs) {
            let event = ChordEvent {
                name: name.to_owned(),
                elapsed_secs,
            };
            self.last_accepted = Some(event.clone());
            TrackerOutput::Accepted(event)
        } else {
            TrackerOutput::Tentative {
                name: name.to_owned(),
            }
        }
    }

    fn may_accept(&self, name: &str, elapsed_secs: f64) -> bool {
        match &self.last_accepted {
            None => true,
            Some(last) if last.name != name => true,
            Some(last) => elapsed_secs - last.elapsed_secs >= self.cooldown_secs,
        }
    }
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_FRAMES, DEFAULT_COOLDOWN_SECS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [u32; 3] = [3, 4, 5];

    fn hit(name: &str) -> MatchResult {
        MatchResult::named(name, 0.9)
    }

    fn accepted(outputs: &[TrackerOutput]) -> Vec<&ChordEvent> {
        outputs
            .iter()
            .filter_map(|o| match o {
                TrackerOutput::Accepted(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_match_starts_a_candidate() {
        let mut t = StabilityTracker::default();
        let out = t.observe(&hit("C Major"), 0.0);
        assert_eq!(
            out,
            TrackerOutput::NewCandidate {
                name: "C Major".into()
            }
        );
        assert_eq!(t.count(), 1);
    }

    #[test]
    fn confirms_after_required_frames() {
        for required in REQUIRED {
            let mut t = StabilityTracker::new(required, 1.5);
            let outputs: Vec<_> = (0..required)
                .map(|i| t.observe(&hit("C Major"), f64::from(i) * 0.1))
                .collect();

            let events = accepted(&outputs);
            assert_eq!(events.len(), 1, "required = {required}");
            assert_eq!(events[0].name, "C Major");
            assert!(matches!(outputs.last(), Some(TrackerOutput::Accepted(_))));
        }
    }

    #[test]
    fn frames_below_threshold_are_tentative() {
        let mut t = StabilityTracker::new(5, 1.5);
        t.observe(&hit("D Minor"), 0.0);
        for i in 1..4_u32 {
            assert_eq!(
                t.observe(&hit("D Minor"), f64::from(i) * 0.1),
                TrackerOutput::Tentative {
                    name: "D Minor".into()
                }
            );
        }
        assert!(t.last_accepted().is_none());
    }

    #[test]
    fn alternating_short_runs_never_confirm() {
        for required in REQUIRED {
            let mut t = StabilityTracker::new(required, 1.5);
            let run = required - 1;
            let mut outputs = Vec::new();
            let mut time = 0.0;
            for cycle in 0..10 {
                let name = if cycle % 2 == 0 { "C Major" } else { "A Minor" };
                for _ in 0..run {
                    outputs.push(t.observe(&hit(name), time));
                    time += 0.1;
                }
            }
            assert!(accepted(&outputs).is_empty(), "required = {required}");
        }
    }

    #[test]
    fn different_name_replaces_candidate_wholesale() {
        let mut t = StabilityTracker::new(5, 1.5);
        for _ in 0..4 {
            t.observe(&hit("E Major"), 0.0);
        }
        t.observe(&MatchResult::named("E Minor", 0.7), 0.1);
        assert_eq!(
            t.state(),
            &StabilityState::Accumulating {
                name: "E Minor".into(),
                score: 0.7,
                count: 1
            }
        );
    }

    #[test]
    fn no_match_resets_candidate() {
        let mut t = StabilityTracker::new(3, 1.5);
        t.observe(&hit("F Major"), 0.0);
        t.observe(&hit("F Major"), 0.1);
        assert_eq!(t.observe(&MatchResult::none(), 0.2), TrackerOutput::NoMatch);
        assert_eq!(t.state(), &StabilityState::NoCandidate);

        // Counting starts over.
        t.observe(&hit("F Major"), 0.3);
        t.observe(&hit("F Major"), 0.4);
        assert_eq!(t.count(), 2);
    }

    #[test]
    fn silence_resets_count_but_keeps_last_accepted() {
        let mut t = StabilityTracker::new(3, 1.5);
        for i in 0..3_u32 {
            t.observe(&hit("A Major"), f64::from(i) * 0.1);
        }
        t.observe(&hit("A Major"), 0.3);
        assert_eq!(t.count(), 4);

        assert_eq!(t.observe_silence(), TrackerOutput::Silenced);
        assert_eq!(t.count(), 0);
        assert_eq!(t.last_accepted().map(|e| e.name.as_str()), Some("A Major"));
    }

    #[test]
    fn held_chord_respects_cooldown() {
        // Acceptance lands exactly at t = 2.0.
        let mut t = StabilityTracker::new(3, 1.5);
        for time in [1.8, 1.9, 2.0] {
            t.observe(&hit("G Major"), time);
        }
        assert_eq!(t.last_accepted().map(|e| e.elapsed_secs), Some(2.0));

        let mut time = 2.1;
        while time < 3.45 {
            let out = t.observe(&hit("G Major"), time);
            assert_eq!(
                out,
                TrackerOutput::Tentative {
                    name: "G Major".into()
                },
                "unexpected output at {time}"
            );
            time += 0.1;
        }

        match t.observe(&hit("G Major"), 3.6) {
            TrackerOutput::Accepted(e) => {
                assert_eq!(e.name, "G Major");
                assert_eq!(e.elapsed_secs, 3.6);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn changed_chord_skips_cooldown() {
        let mut t = StabilityTracker::new(3, 1.5);
        for time in [0.0, 0.1, 0.2] {
            t.observe(&hit("C Major"), time);
        }
        let outputs: Vec<_> = [0.3, 0.4, 0.5]
            .into_iter()
            .map(|time| t.observe(&hit("F Major"), time))
            .collect();
        let events = accepted(&outputs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "F Major");
    }

    #[test]
    fn returning_chord_after_interruption_is_logged_again() {
        let mut t = StabilityTracker::new(3, 1.5);
        for time in [0.0, 0.1, 0.2] {
            t.observe(&hit("C Major"), time);
        }
        for time in [0.3, 0.4, 0.5] {
            t.observe(&hit("G Major"), time);
        }
        let outputs: Vec<_> = [0.6, 0.7, 0.8]
            .into_iter()
            .map(|time| t.observe(&hit("C Major"), time))
            .collect();
        assert_eq!(accepted(&outputs).len(), 1);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut t = StabilityTracker::new(1, 1.5);
        t.observe(&hit("B Minor"), 0.0);
        t.observe(&hit("B Minor"), 0.1);
        assert!(t.last_accepted().is_some());
        t.reset();
        assert_eq!(t.state(), &StabilityState::NoCandidate);
        assert!(t.last_accepted().is_none());
    }

    #[test]
    fn zero_required_frames_is_clamped() {
        let mut t = StabilityTracker::new(0, 1.5);
        t.observe(&hit("C Major"), 0.0);
        assert!(matches!(
            t.observe(&hit("C Major"), 0.1),
            TrackerOutput::Accepted(_)
        ));
    }
}
