//! Capture sessions: lifecycle, per-session pipeline and UI-facing state.
//!
//! # Architecture
//!
//! ```text
//! ChordSession::start()
//!        │
//!        ├─ AudioSource::start(tx)  → StreamHandle (RAII)
//!        └─ worker thread
//!              ├─ downmix → ChromaExtractor
//!              └─ ChordPipeline::process → FrameOutcome
//!
//! SharedState (Arc<Mutex<SessionState>>) ←─── read by egui update() each frame
//! ```

pub mod pipeline;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use pipeline::{ChordPipeline, FrameOutcome};
pub use runner::{ChordSession, SessionError};
pub use state::{lock, new_shared_state, SessionState, SessionStatus, SharedState, MIC_REQUIRED};
