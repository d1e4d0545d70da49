//! Pitch-class (chroma) feature extraction.
//!
//! [`ChromaExtractor`] cuts a mono sample stream into fixed, non-overlapping
//! analysis windows (4096 samples by default) and reports one
//! [`FeatureFrame`] per window:
//!
//! 1. RMS of the raw window (used by the silence gate).
//! 2. DC offset removal and Hann windowing.
//! 3. Forward FFT (rustfft).
//! 4. Each bin inside the analysed band adds its energy (magnitude²) to the
//!    pitch class of its nearest equal-tempered note.
//! 5. The 12 bins are scaled so the strongest class is `1.0`.
//!
//! A window with no energy inside the band has no chroma at all; callers
//! skip such frames.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::chord::{Chroma, PITCH_CLASSES};

use super::gate::rms;

/// Default analysis window in samples.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;
/// Default lower edge of the analysed band (A1).
pub const DEFAULT_MIN_FREQUENCY_HZ: f32 = 55.0;
/// Default upper edge of the analysed band.
pub const DEFAULT_MAX_FREQUENCY_HZ: f32 = 5000.0;

// ---------------------------------------------------------------------------
// FeatureFrame
// ---------------------------------------------------------------------------

/// Features of one analysis window.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// Max-normalised pitch-class energies, or `None` for an empty spectrum.
    pub chroma: Option<Chroma>,
    /// RMS amplitude of the raw window.
    pub rms: f32,
    /// Audio-clock time at the end of the window, in seconds since the
    /// extractor saw its first sample.
    pub timestamp_secs: f64,
}

// ---------------------------------------------------------------------------
// ChromaExtractor
// ---------------------------------------------------------------------------

/// Streaming chroma + RMS extractor.
pub struct ChromaExtractor {
    window_size: usize,
    min_frequency_hz: f32,
    max_frequency_hz: f32,
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
    /// Pitch class of every bin up to Nyquist; `None` outside the band.
    bin_classes: Vec<Option<usize>>,
    sample_rate: Option<u32>,
    pending: Vec<f32>,
    clock_secs: f64,
}

impl ChromaExtractor {
    /// Create an extractor with the default band.
    ///
    /// # Panics
    ///
    /// Panics if `window_size < 2`.
    pub fn new(window_size: usize) -> Self {
        assert!(window_size >= 2, "window_size must be >= 2");

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);

        let n_minus_1 = (window_size - 1) as f32;
        let hann = (0..window_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n_minus_1).cos()))
            .collect();

        Self {
            window_size,
            min_frequency_hz: DEFAULT_MIN_FREQUENCY_HZ,
            max_frequency_hz: DEFAULT_MAX_FREQUENCY_HZ,
            fft,
            hann,
            bin_classes: Vec::new(),
            sample_rate: None,
            pending: Vec::with_capacity(window_size),
            clock_secs: 0.0,
        }
    }

    /// Restrict analysis to `[min_hz, max_hz]`.
    pub fn with_frequency_range(mut self, min_hz: f32, max_hz: f32) -> Self {
        self.min_frequency_hz = min_hz;
        self.max_frequency_hz = max_hz;
        self.sample_rate = None;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Seconds of audio analysed so far.
    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    /// Feed mono samples captured at `sample_rate`; returns every frame
    /// completed by them, oldest first.
    pub fn push(&mut self, mono: &[f32], sample_rate: u32) -> Vec<FeatureFrame> {
        if sample_rate == 0 {
            return Vec::new();
        }
        if self.sample_rate != Some(sample_rate) {
            if self.sample_rate.is_some() {
                log::debug!("features: sample rate changed to {sample_rate} Hz");
                self.pending.clear();
            }
            self.rebuild_bin_map(sample_rate);
        }

        self.pending.extend_from_slice(mono);

        let mut frames = Vec::new();
        while self.pending.len() >= self.window_size {
            let window: Vec<f32> = self.pending.drain(..self.window_size).collect();
            self.clock_secs += self.window_size as f64 / f64::from(sample_rate);
            frames.push(FeatureFrame {
                chroma: self.chroma(&window),
                rms: rms(&window),
                timestamp_secs: self.clock_secs,
            });
        }
        frames
    }

    /// Drop buffered samples and restart the clock.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.clock_secs = 0.0;
    }

    fn rebuild_bin_map(&mut self, sample_rate: u32) {
        let resolution = sample_rate as f32 / self.window_size as f32;
        self.bin_classes = (0..=self.window_size / 2)
            .map(|bin| {
                let freq = bin as f32 * resolution;
                if bin == 0 || freq < self.min_frequency_hz || freq > self.max_frequency_hz {
                    return None;
                }
                // MIDI note number: 69 = A4 = 440 Hz
                let midi = 69.0 + 12.0 * (freq / 440.0).log2();
                Some((midi.round() as i64).rem_euclid(PITCH_CLASSES as i64) as usize)
            })
            .collect();
        self.sample_rate = Some(sample_rate);
    }

    fn chroma(&self, window: &[f32]) -> Option<Chroma> {
        let mean = window.iter().sum::<f32>() / window.len() as f32;
        let mut buffer: Vec<Complex<f32>> = window
            .iter()
            .zip(&self.hann)
            .map(|(s, w)| Complex {
                re: (s - mean) * w,
                im: 0.0,
            })
            .collect();
        self.fft.process(&mut buffer);

        let mut chroma = [0.0_f32; PITCH_CLASSES];
        for (bin, class) in self.bin_classes.iter().enumerate() {
            if let Some(pc) = class {
                chroma[*pc] += buffer[bin].norm_sqr();
            }
        }

        let peak = chroma.iter().copied().fold(0.0_f32, f32::max);
        if !(peak > 0.0) || !peak.is_finite() {
            return None;
        }
        for v in &mut chroma {
            *v /= peak;
        }
        Some(chroma)
    }
}

impl Default for ChromaExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
