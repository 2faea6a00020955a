//! Microphone capture backed by CPAL, saved as WAV files with hound.

use crate::{AppError, AppResult};

use std::{
    collections::VecDeque,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use voice_memo_core::{
    CaptureDevice, CaptureHandle, CoreResult, FinishedCapture, Permission, PlayableHandle,
    SourceLocator,
};

/// Maximum samples to buffer (10 minutes of 48kHz stereo).
/// Prevents unbounded memory growth during long recordings; the oldest
/// audio is dropped past this point.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 2 * 60 * 10;

/// Bit depth of saved recordings.
const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Input device of the default CPAL host, chosen by name or the default.
pub struct CpalMicrophone {
    recordings_dir: PathBuf,
    selected_device: Option<String>,
}

impl CpalMicrophone {
    /// Creates a microphone that writes recordings into `recordings_dir`.
    /// `selected_device` names the input to use; `None` means the default.
    pub fn new(recordings_dir: impl Into<PathBuf>, selected_device: Option<String>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            selected_device,
        }
    }
}

/// Finds the named input device, falling back to the host default when no
/// name is configured or the named device is not connected.
fn input_device(host: &cpal::Host, selected: Option<&str>) -> Option<Device> {
    if let Some(wanted) = selected {
        let found = match host.input_devices() {
            Ok(mut devices) => devices.find(|device| {
                device
                    .description()
                    .is_ok_and(|description| device_name_matches(description.name(), wanted))
            }),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate input devices");
                None
            }
        };

        match found {
            Some(device) => return Some(device),
            None => warn!(device = wanted, "Selected input device not found, using default"),
        }
    }

    host.default_input_device()
}

/// Device names are compared ignoring surrounding whitespace.
pub(crate) fn device_name_matches(name: &str, wanted: &str) -> bool {
    name.trim() == wanted.trim()
}

impl CaptureDevice for CpalMicrophone {
    type Handle = CpalRecording;

    /// Desktop platforms have no runtime prompt; access counts as granted
    /// when an input device is available.
    async fn request_permission(&self) -> CoreResult<Permission> {
        let host = cpal::default_host();
        match input_device(&host, self.selected_device.as_deref()) {
            Some(_) => Ok(Permission::Granted),
            None => {
                warn!("No input device available");
                Ok(Permission::Denied)
            }
        }
    }

    async fn configure_for_recording(&self) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.recordings_dir)
            .await
            .map_err(AppError::from)?;
        debug!(recordings_dir = ?self.recordings_dir, "Recordings directory ready");
        Ok(())
    }

    async fn begin_capture(&self) -> CoreResult<CpalRecording> {
        Ok(CpalRecording::start(
            &self.recordings_dir,
            self.selected_device.as_deref(),
        )?)
    }

    async fn release_recording_mode(&self) -> CoreResult<()> {
        debug!("Recording mode released");
        Ok(())
    }
}

/// An in-progress CPAL input stream.
pub struct CpalRecording {
    id: Uuid,
    path: PathBuf,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after the
    /// samples are collected.
    shutdown: Arc<AtomicBool>,
}

impl CpalRecording {
    #[track_caller]
    #[instrument]
    fn start(recordings_dir: &Path, selected_device: Option<&str>) -> AppResult<Self> {
        let host = cpal::default_host();

        let device =
            input_device(&host, selected_device).ok_or_else(|| AppError::DeviceError {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| AppError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let samples = Arc::new(Mutex::new(VecDeque::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let callback_samples = Arc::clone(&samples);
        let callback_shutdown = Arc::clone(&shutdown);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned mutex still holds valid samples.
                    let mut buf = callback_samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(data.iter().copied());
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AppError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| AppError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let id = Uuid::new_v4();
        let path = recordings_dir.join(format!("{id}.wav"));

        info!(
            recording_id = %id,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Audio capture started"
        );

        Ok(Self {
            id,
            path,
            config,
            stream: Some(stream),
            samples,
            shutdown,
        })
    }

    fn drain(&mut self) -> Vec<f32> {
        self.shutdown.store(true, Ordering::Release);
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!(recording_id = %self.id, "Audio capture stopped");
        }

        let samples: Vec<f32> = self
            .samples
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");
        samples
    }
}

impl CaptureHandle for CpalRecording {
    async fn finalize(mut self) -> CoreResult<FinishedCapture> {
        let source = source_locator(&self.path)?;
        let samples = self.drain();
        let channels = self.config.channels;
        let sample_rate = self.config.sample_rate;
        let duration_millis = duration_millis(samples.len(), channels, sample_rate);

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_wav(&path, &samples, channels, sample_rate))
            .await
            .map_err(|e| AppError::DeviceError {
                reason: format!("WAV writer task panicked: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })??;

        info!(
            recording_id = %self.id,
            path = ?self.path,
            duration_ms = duration_millis,
            "Recording written"
        );

        Ok(FinishedCapture {
            playable: PlayableHandle::new(self.path.clone()),
            duration_millis,
            source,
        })
    }
}

/// Locator persisted for a recording. Paths that are not valid UTF-8 could
/// not be found again after a reload, so they are rejected.
#[track_caller]
pub(crate) fn source_locator(path: &Path) -> AppResult<SourceLocator> {
    path.to_str()
        .map(SourceLocator::new)
        .ok_or_else(|| AppError::DeviceError {
            reason: format!("Recording path {:?} is not valid UTF-8", path),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Length of `sample_count` interleaved samples in milliseconds.
pub(crate) fn duration_millis(sample_count: usize, channels: u16, sample_rate: u32) -> u64 {
    if channels == 0 || sample_rate == 0 {
        return 0;
    }
    let frames = sample_count as u64 / u64::from(channels);
    frames * 1000 / u64::from(sample_rate)
}

/// Writes interleaved f32 samples as 16-bit PCM.
#[track_caller]
pub(crate) fn write_wav(
    path: &Path,
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
) -> AppResult<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let wav_error = |e: hound::Error| AppError::DeviceError {
        reason: format!("Failed to write {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(pcm).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;

    Ok(())
}
