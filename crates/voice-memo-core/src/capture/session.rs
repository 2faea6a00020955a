//! Capture session state machine.
//!
//! Holds at most one active recording. Every transition is applied to the
//! published state before the capture subsystem is called, so a snapshot
//! taken while I/O is pending already reflects the new state.

use crate::{
    ClipEntry, CoreResult, MemoError, Permission,
    capture::{CaptureDevice, CaptureHandle},
    format_duration,
};

use std::{fmt, panic::Location, time::Instant};

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Capture state exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No recording in progress.
    Idle,
    /// A recording is in progress.
    Capturing {
        /// When capture was requested.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl CaptureState {
    /// True while a recording is in progress.
    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureState::Capturing { .. })
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => f.write_str("idle"),
            CaptureState::Capturing { session_id, .. } => write!(f, "capturing ({session_id})"),
        }
    }
}

/// What happened to a start request that did not violate the state machine.
#[derive(Debug)]
pub enum StartOutcome {
    /// Recording has begun.
    Capturing {
        /// Session ID of the new recording.
        session_id: Uuid,
    },
    /// Microphone permission was refused. The session stays idle.
    PermissionDenied,
    /// The capture subsystem failed. Logged; the session stays idle.
    Failed(MemoError),
}

/// Owns the single active recording session, if any.
pub struct CaptureSession<D: CaptureDevice> {
    device: D,
    state: watch::Sender<CaptureState>,
    handle: Option<D::Handle>,
}

impl<D: CaptureDevice> CaptureSession<D> {
    /// Creates an idle session around a capture device.
    pub fn new(device: D) -> Self {
        let (state, _) = watch::channel(CaptureState::Idle);
        Self {
            device,
            state,
            handle: None,
        }
    }

    /// Current capture state.
    pub fn state(&self) -> CaptureState {
        *self.state.borrow()
    }

    /// Receiver that observes every capture state change.
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.subscribe()
    }

    /// The capture device this session drives.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Starts a new recording.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if a recording is already in
    /// progress. Permission denial and capture failures are reported through
    /// [`StartOutcome`] instead.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> CoreResult<StartOutcome> {
        let current = self.state();
        if current.is_capturing() {
            return Err(MemoError::InvalidStateTransition {
                from: current,
                attempted: "start capture",
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session_id = Uuid::new_v4();
        self.state.send_replace(CaptureState::Capturing {
            started_at: Instant::now(),
            session_id,
        });

        match self.open_capture().await {
            Ok(Some(handle)) => {
                self.handle = Some(handle);
                info!(session_id = %session_id, "Capture started");
                Ok(StartOutcome::Capturing { session_id })
            }
            Ok(None) => {
                self.state.send_replace(CaptureState::Idle);
                warn!(session_id = %session_id, "Microphone permission denied");
                Ok(StartOutcome::PermissionDenied)
            }
            Err(e) => {
                self.state.send_replace(CaptureState::Idle);
                error!(session_id = %session_id, error = ?e, "Failed to start capture");
                Ok(StartOutcome::Failed(e))
            }
        }
    }

    /// Stops the active recording and turns it into a catalog entry named `name`.
    ///
    /// The session is idle as soon as this is called, so the handle can
    /// never be finalized twice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` when idle, or `Capture` if the
    /// subsystem fails to finalize the recording.
    #[instrument(skip(self))]
    pub async fn stop(&mut self, name: String) -> CoreResult<ClipEntry> {
        let CaptureState::Capturing {
            started_at,
            session_id,
        } = self.state()
        else {
            return Err(MemoError::InvalidStateTransition {
                from: CaptureState::Idle,
                attempted: "stop capture",
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let handle = self.handle.take();
        self.state.send_replace(CaptureState::Idle);

        let Some(handle) = handle else {
            return Err(MemoError::Capture {
                reason: format!("No capture handle for session {session_id}"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let finished = handle.finalize().await.inspect_err(|e| {
            error!(session_id = %session_id, error = ?e, "Failed to finalize capture");
        });

        // Recording mode is left whether or not the clip survived.
        if let Err(e) = self.device.release_recording_mode().await {
            warn!(session_id = %session_id, error = ?e, "Failed to leave recording mode");
        }

        let finished = finished?;

        let duration_label = format_duration(finished.duration_millis);

        info!(
            session_id = %session_id,
            duration_ms = finished.duration_millis,
            elapsed_ms = started_at.elapsed().as_millis(),
            source = %finished.source,
            "Capture finalized"
        );

        Ok(ClipEntry::new(
            name,
            duration_label,
            finished.source,
            Some(finished.playable),
        ))
    }

    async fn open_capture(&self) -> CoreResult<Option<D::Handle>> {
        if self.device.request_permission().await? == Permission::Denied {
            return Ok(None);
        }

        self.device.configure_for_recording().await?;
        let handle = self.device.begin_capture().await?;

        Ok(Some(handle))
    }
}
