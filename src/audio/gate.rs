//! Energy-based silence gate.
//!
//! Analysis frames whose RMS amplitude falls below the floor are treated as
//! inaudible: they never reach the chroma window and they interrupt any
//! chord that was accumulating.

/// Default RMS floor below which a frame counts as silence.
pub const DEFAULT_SILENCE_FLOOR: f32 = 0.005;

/// Root-mean-square amplitude of `samples`; `0.0` for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

// ---------------------------------------------------------------------------
// SilenceGate
// ---------------------------------------------------------------------------

/// Classifies frames as silent or audible by their RMS energy.
///
/// # Example
///
/// ```rust
/// use chord_listener::audio::SilenceGate;
///
/// let gate = SilenceGate::new(0.005);
/// assert!(gate.is_silent(0.001));
/// assert!(!gate.is_silent(0.2));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SilenceGate {
    /// RMS amplitude floor; frames strictly below it are silence.
    rms_floor: f32,
}

impl SilenceGate {
    /// Create a gate with the given RMS floor.
    ///
    /// `0.005` suits a quiet room and a guitar a metre from the microphone;
    /// raise it in noisy environments.
    pub fn new(rms_floor: f32) -> Self {
        Self { rms_floor }
    }

    /// RMS floor currently in use.
    pub fn floor(&self) -> f32 {
        self.rms_floor
    }

    /// Returns `true` when a frame with energy `rms` is inaudible.
    pub fn is_silent(&self, rms: f32) -> bool {
        rms < self.rms_floor
    }

    /// Convenience over raw samples.
    pub fn is_silent_samples(&self, samples: &[f32]) -> bool {
        self.is_silent(rms(samples))
    }
}

impl Default for SilenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_SILENCE_FLOOR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
