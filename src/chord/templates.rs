//! Static chord template bank.
//!
//! One binary pitch-class template per (root, quality) pair: 12 roots ×
//! {major, minor} = 24 templates.  Each template marks the root, third and
//! fifth of the triad with `1.0` and leaves the other nine bins at `0.0`.
//!
//! ```rust
//! use chord_listener::chord::build_templates;
//!
//! let bank = build_templates();
//! assert_eq!(bank.len(), 24);
//! assert_eq!(bank[0].name, "C Major");
//! assert_eq!(bank[1].name, "C Minor");
//! ```

use std::fmt;
use std::sync::OnceLock;

use super::{Chroma, PITCH_CLASSES};

/// Pitch-class names, index 0 = C.
pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// ---------------------------------------------------------------------------
// ChordQuality
// ---------------------------------------------------------------------------

/// Triad qualities in the vocabulary, in bank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// All qualities, major before minor.
    pub const ALL: [ChordQuality; 2] = [ChordQuality::Major, ChordQuality::Minor];

    /// Semitone offsets of the triad members above the root.
    pub fn intervals(self) -> [usize; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ChordTemplate
// ---------------------------------------------------------------------------

/// An idealised chroma vector for one triad.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplate {
    /// Display label, e.g. `"C# Minor"`.
    pub name: String,
    /// Root pitch class (0 = C).
    pub root: usize,
    pub quality: ChordQuality,
    /// Binary membership marks for root, third and fifth.
    pub vector: Chroma,
}

impl ChordTemplate {
    /// Build the template for `root` (taken modulo 12) and `quality`.
    pub fn new(root: usize, quality: ChordQuality) -> Self {
        let root = root % PITCH_CLASSES;
        let mut vector = [0.0_f32; PITCH_CLASSES];
        for interval in quality.intervals() {
            vector[(root + interval) % PITCH_CLASSES] = 1.0;
        }
        Self {
            name: format!("{} {}", NOTE_NAMES[root], quality),
            root,
            quality,
            vector,
        }
    }
}

// ---------------------------------------------------------------------------
// Bank construction
// ---------------------------------------------------------------------------

/// Build the full 24-template bank.
///
/// Order is root-ascending with major before minor, so the first template
/// is `"C Major"` and the last is `"B Minor"`.  The matcher relies on this
/// order for tie-breaking.
pub fn build_templates() -> Vec<ChordTemplate> {
    (0..PITCH_CLASSES)
        .flat_map(|root| {
            ChordQuality::ALL
                .into_iter()
                .map(move |quality| ChordTemplate::new(root, quality))
        })
        .collect()
}

/// Process-wide template bank, built on first access.
pub fn template_bank() -> &'static [ChordTemplate] {
    static BANK: OnceLock<Vec<ChordTemplate>> = OnceLock::new();
    BANK.get_or_init(build_templates)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bank_has_24_templates() {
        assert_eq!(build_templates().len(), 24);
    }

    #[test]
    fn every_template_marks_exactly_three_bins() {
        for t in build_templates() {
            let ones = t.vector.iter().filter(|&&v| v == 1.0).count();
            let zeros = t.vector.iter().filter(|&&v| v == 0.0).count();
            assert_eq!(ones, 3, "{}", t.name);
            assert_eq!(zeros, 9, "{}", t.name);
        }
    }

    #[test]
    fn template_names_are_unique() {
        let bank = build_templates();
        let names: HashSet<&str> = bank.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), bank.len());
    }

    #[test]
    fn order_is_root_major_then_minor() {
        let bank = build_templates();
        assert_eq!(bank[0].name, "C Major");
        assert_eq!(bank[1].name, "C Minor");
        assert_eq!(bank[2].name, "C# Major");
        assert_eq!(bank[19].name, "A Minor");
        assert_eq!(bank[23].name, "B Minor");
    }

    #[test]
    fn a_minor_wraps_around_the_octave() {
        // A C E = 9, 0, 4
        let t = ChordTemplate::new(9, ChordQuality::Minor);
        let marked: Vec<usize> = (0..12).filter(|&i| t.vector[i] == 1.0).collect();
        assert_eq!(marked, vec![0, 4, 9]);
    }

    #[test]
    fn static_bank_matches_fresh_build() {
        assert_eq!(template_bank(), build_templates().as_slice());
    }
}
