//! Audio front end — microphone capture → downmix → chroma features → silence gate.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → downmix
//!           → ChromaExtractor (4096-sample windows) → FeatureFrame
//!           → SilenceGate
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::mpsc;
//! use chord_listener::audio::{downmix, AudioCapture, AudioChunk, ChromaExtractor};
//!
//! let (tx, rx) = mpsc::channel::<AudioChunk>();
//! let capture = AudioCapture::open(None).unwrap();
//! let _handle = capture.start(tx).unwrap(); // drops handle → stops stream
//!
//! let mut extractor = ChromaExtractor::default();
//! while let Ok(chunk) = rx.recv() {
//!     let mono = downmix(&chunk.samples, chunk.channels);
//!     for frame in extractor.push(&mono, chunk.sample_rate) {
//!         println!("{:.2}s rms={:.4}", frame.timestamp_secs, frame.rms);
//!     }
//! }
//! ```

pub mod buffer;
pub mod capture;
pub mod downmix;
pub mod features;
pub mod gate;

pub use buffer::RingBuffer;
pub use capture::{
    list_input_devices, AudioCapture, AudioChunk, AudioSource, CaptureError, MicrophoneSource,
    StreamHandle,
};
pub use downmix::downmix;
pub use features::{ChromaExtractor, FeatureFrame};
pub use gate::{rms, SilenceGate};
