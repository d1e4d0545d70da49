//! Normalisation and similarity scoring over fixed-length vectors.
//!
//! Both helpers are total over degenerate input: an all-zero (or empty)
//! vector normalises to itself and scores `0.0` against anything.

/// Euclidean norm of `v`.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit Euclidean length.
///
/// Returns an unchanged copy when the sum of squares is zero.
///
/// ```rust
/// use chord_listener::chord::normalize;
///
/// let n = normalize(&[3.0, 4.0]);
/// assert!((n[0] - 0.6).abs() < 1e-6);
/// assert!((n[1] - 0.8).abs() < 1e-6);
/// assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
/// ```
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let sum_sq: f32 = v.iter().map(|x| x * x).sum();
    if sum_sq == 0.0 {
        return v.to_vec();
    }
    let norm = sum_sq.sqrt();
    v.iter().map(|x| x / norm).collect()
}

/// Cosine of the angle between `a` and `b`.
///
/// Returns `0.0` if either vector has zero norm.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine_similarity requires equal-length vectors"
    );

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn normalize_produces_unit_length() {
        let n = normalize(&[1.0, 2.0, 2.0]);
        assert!((magnitude(&n) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&[0.2, 0.9, 0.0, 0.4, 1.3]);
        let twice = normalize(&once);
        assert!(approx_eq(&once, &twice), "{once:?} vs {twice:?}");
    }

    #[test]
    fn normalize_zero_vector_is_unchanged() {
        assert_eq!(normalize(&[0.0; 12]), vec![0.0; 12]);
    }

    #[test]
    fn normalize_empty_vector_is_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3, 0.0, 1.0, 0.5, 0.0, 0.0, 0.7, 0.0, 0.1, 0.0, 0.0, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_is_scale_invariant() {
        let a = [1.0, 0.0, 1.0];
        let b = [5.0, 0.0, 5.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn similarity_with_zero_vector_is_zero() {
        let v = [1.0; 12];
        assert_eq!(cosine_similarity(&v, &[0.0; 12]), 0.0);
        assert_eq!(cosine_similarity(&[0.0; 12], &[0.0; 12]), 0.0);
    }

    #[test]
    fn zero_length_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "equal-length")]
    fn mismatched_lengths_panic() {
        cosine_similarity(&[1.0, 2.0], &[1.0]);
    }
}
