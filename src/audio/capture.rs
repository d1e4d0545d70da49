//! Microphone input via `cpal`.
//!
//! [`AudioCapture`] resolves an input device and its default stream format.
//! [`AudioCapture::start`] builds the input stream and forwards every
//! hardware buffer as an [`AudioChunk`] over an mpsc channel, converting
//! `i16`/`u16` devices to `f32` on the way. The [`StreamHandle`] it returns
//! keeps the stream alive; dropping it ends delivery.
//!
//! Sessions open capture through the [`AudioSource`] trait so tests can
//! substitute scripted audio for [`MicrophoneSource`].

use std::any::Any;
use std::fmt;
use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// One hardware buffer, interleaved, as `f32` in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Capture rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count; fold with [`crate::audio::downmix`].
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// Keeps a capture alive until dropped.
///
/// Holds whatever the source needs to keep delivering; for the microphone
/// that is the `cpal::Stream` (which owns the callback and its sender).
pub struct StreamHandle {
    _guard: Box<dyn Any>,
}

impl StreamHandle {
    pub fn new<G: Any>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("input device has no usable default config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported input sample format {0}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// AudioSource
// ---------------------------------------------------------------------------

/// Something a session can pull audio from.
pub trait AudioSource {
    /// Begin delivering chunks to `tx` until the returned handle is dropped.
    fn start(&mut self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError>;
}

/// The system microphone. The device is looked up again on every start so
/// a re-plugged microphone is picked up by the next session.
#[derive(Debug, Clone, Default)]
pub struct MicrophoneSource {
    /// `None` selects the host's default input.
    pub device_name: Option<String>,
}

impl MicrophoneSource {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

impl AudioSource for MicrophoneSource {
    fn start(&mut self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        AudioCapture::open(self.device_name.as_deref())?.start(tx)
    }
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// A resolved input device plus the format it will be opened with.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use chord_listener::audio::AudioCapture;
///
/// let (tx, rx) = mpsc::channel();
/// let capture = AudioCapture::open(None).unwrap();
/// let handle = capture.start(tx).unwrap();
/// let first = rx.recv().unwrap();
/// println!("{} samples @ {} Hz", first.samples.len(), first.sample_rate);
/// drop(handle);
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    name: String,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

impl AudioCapture {
    /// Resolve `device_name` on the default host, or the default input when
    /// `None`. An unknown name falls back to the default with a warning.
    pub fn open(device_name: Option<&str>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();

        let mut device = None;
        if let Some(wanted) = device_name {
            device = host
                .input_devices()?
                .find(|d| d.name().is_ok_and(|n| n == wanted));
            if device.is_none() {
                log::warn!("capture: input device '{wanted}' not found, using default");
            }
        }
        let device = match device {
            Some(d) => d,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config = supported.config();
        let name = device.name().unwrap_or_else(|_| "<unnamed>".into());

        log::info!(
            "capture: '{name}' {} Hz, {} ch, {sample_format}",
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            name,
            config,
            sample_format,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.name
    }

    /// Build and play the input stream.
    ///
    /// Chunks are sent from the audio thread; a dropped receiver is ignored
    /// so the callback never panics.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(tx)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(tx)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(tx)?,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };
        stream.play()?;
        Ok(StreamHandle::new(stream))
    }

    fn build_stream<T>(&self, tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError>
    where
        T: Sample + SizedSample,
        f32: FromSample<T>,
    {
        let sample_rate = self.config.sample_rate.0;
        let channels = self.config.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: data.iter().map(|&s| s.to_sample::<f32>()).collect(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| log::error!("capture: stream error: {err}"),
            None,
        )?;
        Ok(stream)
    }
}

/// Names of every input device on the default host.
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    Ok(host
        .input_devices()?
        .filter_map(|d| d.name().ok())
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
