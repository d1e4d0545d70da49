//! Chord recognition core — template bank, matching and debouncing.
//!
//! # Pipeline
//!
//! ```text
//! chroma frame ──▶ ChromaAggregator (15-frame mean)
//!              ──▶ ChordMatcher (cosine vs 24 triad templates, floor 0.45)
//!              ──▶ StabilityTracker (N agreeing frames, 1.5 s re-log cooldown)
//!              ──▶ ChordEvent
//! ```
//!
//! Nothing in here knows about audio devices; the session layer feeds it.

pub mod aggregator;
pub mod matcher;
pub mod stability;
pub mod templates;
pub mod vector;

/// Number of pitch classes in a chroma vector.
pub const PITCH_CLASSES: usize = 12;

/// Energy per pitch class, index 0 = C.
pub type Chroma = [f32; PITCH_CLASSES];

pub use aggregator::ChromaAggregator;
pub use matcher::{ChordMatcher, MatchResult};
pub use stability::{ChordEvent, StabilityState, StabilityTracker, TrackerOutput};
pub use templates::{build_templates, template_bank, ChordQuality, ChordTemplate, NOTE_NAMES};
pub use vector::{cosine_similarity, normalize};
