//! Template matching of an averaged chroma vector.

use super::templates::template_bank;
use super::vector::{cosine_similarity, normalize};
use super::Chroma;

/// Default minimum cosine similarity for a match to count.
pub const DEFAULT_ACCEPTANCE_FLOOR: f32 = 0.45;

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// Outcome of matching one averaged chroma vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Best template name, or `None` when nothing cleared the floor.
    pub name: Option<String>,
    /// Cosine similarity of the best template, in `[0, 1]`.
    pub score: f32,
}

impl MatchResult {
    /// A result carrying no chord.
    pub fn none() -> Self {
        Self {
            name: None,
            score: 0.0,
        }
    }

    /// A result naming `name` with `score`.
    pub fn named(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: Some(name.into()),
            score,
        }
    }

    pub fn is_match(&self) -> bool {
        self.name.is_some()
    }
}

// ---------------------------------------------------------------------------
// ChordMatcher
// ---------------------------------------------------------------------------

struct NormalizedTemplate {
    name: &'static str,
    vector: Vec<f32>,
}

/// Scores a chroma vector against every template in the bank.
pub struct ChordMatcher {
    templates: Vec<NormalizedTemplate>,
    acceptance_floor: f32,
}

impl ChordMatcher {
    /// Create a matcher over the process-wide template bank.
    pub fn new(acceptance_floor: f32) -> Self {
        let templates = template_bank()
            .iter()
            .map(|t| NormalizedTemplate {
                name: t.name.as_str(),
                vector: normalize(&t.vector),
            })
            .collect();
        Self {
            templates,
            acceptance_floor,
        }
    }

    pub fn acceptance_floor(&self) -> f32 {
        self.acceptance_floor
    }

    /// Find the best template for `avg`.
    ///
    /// Ties keep the first template in bank order (lowest root, major before
    /// minor).  Scores below the acceptance floor yield [`MatchResult::none`].
    pub fn best_match(&self, avg: Option<&Chroma>) -> MatchResult {
        let Some(avg) = avg else {
            return MatchResult::none();
        };
        let input = normalize(avg);

        let mut best: Option<(&str, f32)> = None;
        for t in &self.templates {
            let score = cosine_similarity(&input, &t.vector);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((t.name, score));
            }
        }

        match best {
            Some((name, score)) if score >= self.acceptance_floor => {
                MatchResult::named(name, score)
            }
            _ => MatchResult::none(),
        }
    }
}

impl Default for ChordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPTANCE_FLOOR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::templates::build_templates;

    #[test]
    fn absent_input_is_no_match() {
        assert_eq!(ChordMatcher::default().best_match(None), MatchResult::none());
    }

    #[test]
    fn every_template_matches_itself() {
        let matcher = ChordMatcher::default();
        for t in build_templates() {
            let result = matcher.best_match(Some(&t.vector));
            assert_eq!(result.name.as_deref(), Some(t.name.as_str()));
            assert!((result.score - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn scaled_input_matches_the_same_template() {
        let mut v = build_templates()[14].vector; // G Major
        for x in &mut v {
            *x *= 0.02;
        }
        let result = ChordMatcher::default().best_match(Some(&v));
        assert_eq!(result.name.as_deref(), Some("G Major"));
    }

    #[test]
    fn silence_vector_is_no_match() {
        let result = ChordMatcher::default().best_match(Some(&[0.0; 12]));
        assert!(!result.is_match());
    }

    #[test]
    fn flat_spectrum_falls_below_the_floor() {
        // Uniform energy scores 3 / sqrt(12 * 3) = 0.5 against every triad;
        // a stricter floor rejects it.
        let flat = [1.0; 12];
        let strict = ChordMatcher::new(0.6);
        assert!(!strict.best_match(Some(&flat)).is_match());

        // The default floor accepts it and keeps the first template.
        let lenient = ChordMatcher::default().best_match(Some(&flat));
        assert_eq!(lenient.name.as_deref(), Some("C Major"));
    }

    #[test]
    fn tie_keeps_lowest_root_major_first() {
        // Equal mix of C Major and A Minor scores the same against both.
        let mut v = [0.0; 12];
        v[0] = 1.0;
        v[4] = 1.0;
        v[7] = 0.5;
        v[9] = 0.5;
        let result = ChordMatcher::default().best_match(Some(&v));
        assert_eq!(result.name.as_deref(), Some("C Major"));
    }

    #[test]
    fn noisy_minor_chord_is_recognised() {
        let mut v = build_templates()[3].vector; // C# Minor
        v[0] += 0.1;
        v[6] += 0.15;
        let result = ChordMatcher::default().best_match(Some(&v));
        assert_eq!(result.name.as_deref(), Some("C# Minor"));
        assert!(result.score > 0.9);
    }
}
