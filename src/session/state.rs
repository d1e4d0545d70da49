//! Session status and the state shared with the UI.
//!
//! [`SessionStatus`] is what the status line shows. [`SessionState`] is the
//! single source of truth the UI reads each frame: current status, the
//! ordered chord log and whether a session is live.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>`, cheap to
//! clone and safe to share between the UI thread and the session worker.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::chord::ChordEvent;

use super::pipeline::FrameOutcome;

/// Status text shown when the microphone cannot be opened.
pub const MIC_REQUIRED: &str = "Microphone access required";

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// What the status line shows.
///
/// ```text
/// Waiting ──start ok──▶ Listening ──agreeing frames──▶ Tentative(X)
///                          ▲   ▲                        │
///                          │   └──────no match──────────┤
///                          │                            ▼
///                          └──────no match──────── Confirmed(X)
/// any ──stop──▶ Stopped        any ──start failed──▶ Error
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    /// No session has run yet.
    #[default]
    Waiting,
    /// Capturing; no chord is being displayed.
    Listening,
    /// A chord is agreeing across frames but was not (re)logged.
    Tentative(String),
    /// The chord was just confirmed and logged.
    Confirmed(String),
    /// The session was stopped by the user.
    Stopped,
    /// Capture could not start.
    Error(String),
}

impl SessionStatus {
    /// Text for the status line.
    ///
    /// ```
    /// use chord_listener::session::SessionStatus;
    ///
    /// assert_eq!(SessionStatus::Listening.display_text(), "Listening...");
    /// assert_eq!(SessionStatus::Tentative("A Minor".into()).display_text(), "...A Minor");
    /// assert_eq!(SessionStatus::Confirmed("A Minor".into()).display_text(), "A Minor");
    /// ```
    pub fn display_text(&self) -> String {
        match self {
            SessionStatus::Waiting => "Waiting...".into(),
            SessionStatus::Listening => "Listening...".into(),
            SessionStatus::Tentative(name) => format!("...{name}"),
            SessionStatus::Confirmed(name) => name.clone(),
            SessionStatus::Stopped => "Stopped.".into(),
            SessionStatus::Error(message) => message.clone(),
        }
    }

    /// `true` for statuses that only occur while capturing.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SessionStatus::Listening | SessionStatus::Tentative(_) | SessionStatus::Confirmed(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SessionStatus::Error(_))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything the UI needs about the current (or last) session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Current status line.
    pub status: SessionStatus,
    /// Accepted chords in acceptance order; cleared when a session starts.
    pub events: Vec<ChordEvent>,
    /// `true` between a successful start and the matching stop.
    pub listening: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the log and status for a fresh session.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Waiting;
        self.events.clear();
        self.listening = false;
    }

    /// Publish what one frame changed.
    pub fn apply(&mut self, outcome: FrameOutcome) {
        if let Some(status) = outcome.status {
            self.status = status;
        }
        if let Some(event) = outcome.event {
            self.events.push(event);
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Cheap to clone (`Arc` clone). Hold the lock only for short critical
/// sections.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] in the `Waiting` status.
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SessionState::new()))
}

/// Lock `state`, recovering the data if a previous holder panicked.
pub fn lock(state: &SharedState) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- SessionStatus::display_text ---

    #[test]
    fn display_waiting() {
        assert_eq!(SessionStatus::Waiting.display_text(), "Waiting...");
    }

    #[test]
    fn display_listening() {
        assert_eq!(SessionStatus::Listening.display_text(), "Listening...");
    }

    #[test]
    fn display_tentative_prefixes_ellipsis() {
        let s = SessionStatus::Tentative("G Major".into());
        assert_eq!(s.display_text(), "...G Major");
    }

    #[test]
    fn display_confirmed_is_bare_name() {
        let s = SessionStatus::Confirmed("G Major".into());
        assert_eq!(s.to_string(), "G Major");
    }

    #[test]
    fn display_stopped() {
        assert_eq!(SessionStatus::Stopped.display_text(), "Stopped.");
    }

    #[test]
    fn display_error_is_message() {
        let s = SessionStatus::Error(MIC_REQUIRED.into());
        assert_eq!(s.display_text(), "Microphone access required");
        assert!(s.is_error());
    }

    // ---- is_live ---

    #[test]
    fn live_statuses() {
        assert!(SessionStatus::Listening.is_live());
        assert!(SessionStatus::Tentative("C Major".into()).is_live());
        assert!(SessionStatus::Confirmed("C Major".into()).is_live());
        assert!(!SessionStatus::Waiting.is_live());
        assert!(!SessionStatus::Stopped.is_live());
        assert!(!SessionStatus::Error("x".into()).is_live());
    }

    // ---- SessionState / SharedState ---

    #[test]
    fn default_state_is_waiting_and_empty() {
        let state = SessionState::default();
        assert_eq!(state.status, SessionStatus::Waiting);
        assert!(state.events.is_empty());
        assert!(!state.listening);
    }

    fn d_minor_accepted() -> FrameOutcome {
        FrameOutcome {
            status: Some(SessionStatus::Confirmed("D Minor".into())),
            event: Some(ChordEvent {
                name: "D Minor".into(),
                elapsed_secs: 1.2,
            }),
        }
    }

    #[test]
    fn apply_appends_and_confirms() {
        let mut state = SessionState::new();
        state.apply(d_minor_accepted());
        assert_eq!(state.status, SessionStatus::Confirmed("D Minor".into()));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn apply_without_status_keeps_display() {
        let mut state = SessionState::new();
        state.apply(d_minor_accepted());
        state.apply(FrameOutcome::default());
        assert_eq!(state.status, SessionStatus::Confirmed("D Minor".into()));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn reset_clears_log() {
        let mut state = SessionState::new();
        state.apply(d_minor_accepted());
        state.listening = true;
        state.reset();
        assert!(state.events.is_empty());
        assert!(!state.listening);
        assert_eq!(state.status, SessionStatus::Waiting);
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state();
        let state2 = Arc::clone(&state);

        lock(&state).status = SessionStatus::Listening;
        assert_eq!(lock(&state2).status, SessionStatus::Listening);
    }
}
