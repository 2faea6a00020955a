mod session;

pub use session::{CaptureSession, CaptureState, StartOutcome};

use crate::{CoreResult, PlayableHandle, SourceLocator};

use std::future::Future;

/// Answer to a microphone permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The user allowed microphone access.
    Granted,
    /// The user refused, or the platform has no usable input.
    Denied,
}

/// Result of finalizing a capture.
#[derive(Debug, Clone)]
pub struct FinishedCapture {
    /// Handle the playback subsystem can play immediately.
    pub playable: PlayableHandle,
    /// Length of the recording.
    pub duration_millis: u64,
    /// Where the recording was written.
    pub source: SourceLocator,
}

/// Device audio-capture subsystem.
///
/// Every call may fail; the session controller catches those failures at
/// the call site.
pub trait CaptureDevice {
    /// In-progress recording returned by [`CaptureDevice::begin_capture`].
    type Handle: CaptureHandle;

    /// Asks the platform for microphone access.
    fn request_permission(&self) -> impl Future<Output = CoreResult<Permission>>;

    /// Switches the audio session into recording mode.
    fn configure_for_recording(&self) -> impl Future<Output = CoreResult<()>>;

    /// Starts recording.
    fn begin_capture(&self) -> impl Future<Output = CoreResult<Self::Handle>>;

    /// Leaves recording mode once a capture has been finalized.
    fn release_recording_mode(&self) -> impl Future<Output = CoreResult<()>>;
}

/// An in-progress recording owned by the capture subsystem.
pub trait CaptureHandle {
    /// Stops recording and produces the playable result. Consumes the handle.
    fn finalize(self) -> impl Future<Output = CoreResult<FinishedCapture>>;
}
