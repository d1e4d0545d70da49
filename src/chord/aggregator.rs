//! Sliding-window chroma smoothing.
//!
//! [`ChromaAggregator`] keeps the most recent N chroma frames (15 by default)
//! and reports their element-wise mean.  Averaging suppresses single-frame
//! transients such as pick attacks while staying responsive within a window
//! of audio.

use crate::audio::RingBuffer;

use super::{Chroma, PITCH_CLASSES};

/// Default number of frames in the smoothing window.
pub const DEFAULT_WINDOW_FRAMES: usize = 15;

/// Bounded FIFO of chroma frames with a rolling average.
#[derive(Debug, Clone)]
pub struct ChromaAggregator {
    frames: RingBuffer<Chroma>,
}

impl ChromaAggregator {
    /// Create an aggregator holding at most `window_frames` frames.
    ///
    /// # Panics
    ///
    /// Panics if `window_frames == 0`.
    pub fn new(window_frames: usize) -> Self {
        Self {
            frames: RingBuffer::new(window_frames),
        }
    }

    /// Append a frame, evicting the oldest once the window is full.
    pub fn push(&mut self, frame: Chroma) {
        self.frames.push(frame);
    }

    /// Element-wise mean of the buffered frames, or `None` when empty.
    pub fn average(&self) -> Option<Chroma> {
        if self.frames.is_empty() {
            return None;
        }
        let mut avg = [0.0_f32; PITCH_CLASSES];
        for frame in self.frames.iter() {
            for (acc, v) in avg.iter_mut().zip(frame) {
                *acc += v;
            }
        }
        let n = self.frames.len() as f32;
        for acc in &mut avg {
            *acc /= n;
        }
        Some(avg)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of frames currently buffered.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }
}

impl Default for ChromaAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_FRAMES)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
