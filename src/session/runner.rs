//! Capture session lifecycle: start/stop and the worker thread.
//!
//! [`ChordSession`] owns the [`AudioSource`] and the [`SharedState`] the UI
//! reads. Each successful [`start`](ChordSession::start) spawns one worker
//! thread that consumes audio chunks strictly in arrival order:
//!
//! ```text
//! AudioSource ──AudioChunk (mpsc)──▶ worker thread
//!                                     ├─ downmix
//!                                     ├─ ChromaExtractor::push
//!                                     ├─ ChordPipeline::process   (per frame)
//!                                     └─ SharedState ◀── read by egui update()
//! ```
//!
//! All pipeline state lives on the worker; only the status and the chord log
//! are shared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::audio::{downmix, AudioChunk, AudioSource, CaptureError, ChromaExtractor, StreamHandle};
use crate::config::{AppConfig, AudioConfig, DetectionConfig};

use super::pipeline::ChordPipeline;
use super::state::{lock, new_shared_state, SessionStatus, SharedState, MIC_REQUIRED};

/// How often an idle worker re-checks the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Reasons a session could not start.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not open the audio input: {0}")]
    Device(#[from] CaptureError),

    #[error("could not spawn the session worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

// ---------------------------------------------------------------------------
// ChordSession
// ---------------------------------------------------------------------------

/// Resources of a running session. Dropping the stream ends capture.
struct ActiveSession {
    stop: Arc<AtomicBool>,
    stream: StreamHandle,
    worker: JoinHandle<()>,
}

/// Start/stop control over one audio source.
///
/// ```rust,no_run
/// use chord_listener::audio::MicrophoneSource;
/// use chord_listener::config::AppConfig;
/// use chord_listener::session::ChordSession;
///
/// let mut session = ChordSession::new(MicrophoneSource::default(), AppConfig::default());
/// session.start().unwrap();
/// // ... the UI polls session.state() ...
/// session.stop();
/// ```
pub struct ChordSession {
    source: Box<dyn AudioSource>,
    config: AppConfig,
    state: SharedState,
    active: Option<ActiveSession>,
}

impl ChordSession {
    pub fn new(source: impl AudioSource + 'static, config: AppConfig) -> Self {
        Self {
            source: Box::new(source),
            config,
            state: new_shared_state(),
            active: None,
        }
    }

    /// Handle to the status and chord log.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    pub fn is_listening(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a fresh session, stopping any running one first.
    ///
    /// The chord log is cleared. On failure the status shows
    /// "Microphone access required" and nothing is left running.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.stop();
        lock(&self.state).reset();

        let (tx, rx) = mpsc::channel::<AudioChunk>();
        let stream = match self.source.start(tx) {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("session: audio input unavailable: {e}");
                self.fail();
                return Err(SessionError::Device(e));
            }
        };

        {
            let mut state = lock(&self.state);
            state.status = SessionStatus::Listening;
            state.listening = true;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            detection: self.config.detection.clone(),
            audio: self.config.audio.clone(),
            state: Arc::clone(&self.state),
            stop: Arc::clone(&stop),
        };
        let spawned = thread::Builder::new()
            .name("chord-session".into())
            .spawn(move || worker.run(rx));

        match spawned {
            Ok(worker) => {
                log::info!("session: listening");
                self.active = Some(ActiveSession {
                    stop,
                    stream,
                    worker,
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("session: worker spawn failed: {e}");
                drop(stream);
                self.fail();
                Err(SessionError::WorkerSpawn(e))
            }
        }
    }

    /// Stop the running session, if any. Safe to call repeatedly.
    ///
    /// Partially accumulated chords are discarded; the log stays readable
    /// until the next [`start`](Self::start).
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        active.stop.store(true, Ordering::Release);
        drop(active.stream);
        if active.worker.join().is_err() {
            log::error!("session: worker panicked");
        }

        let mut state = lock(&self.state);
        state.status = SessionStatus::Stopped;
        state.listening = false;
        log::info!("session: stopped with {} chord(s) logged", state.events.len());
    }

    fn fail(&self) {
        let mut state = lock(&self.state);
        state.status = SessionStatus::Error(MIC_REQUIRED.into());
        state.listening = false;
    }
}

impl Drop for ChordSession {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Everything the worker thread takes with it.
struct Worker {
    detection: DetectionConfig,
    audio: AudioConfig,
    state: SharedState,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(self, rx: Receiver<AudioChunk>) {
        let mut extractor = ChromaExtractor::new(self.audio.analysis_window_size)
            .with_frequency_range(self.audio.min_frequency_hz, self.audio.max_frequency_hz);
        // The extractor clock starts at the session's first sample.
        let mut pipeline = ChordPipeline::new(&self.detection, 0.0);

        while !self.stopped() {
            let chunk = match rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let mono = downmix(&chunk.samples, chunk.channels);
            for frame in extractor.push(&mono, chunk.sample_rate) {
                let outcome = pipeline.process(&frame);
                if self.stopped() {
                    return;
                }
                lock(&self.state).apply(outcome);
            }
        }
        log::debug!("session: worker exiting after {:.1}s of audio", extractor.clock_secs());
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
