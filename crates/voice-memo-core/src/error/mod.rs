use crate::CaptureState;

use error_location::ErrorLocation;
use thiserror::Error;

/// Voice memo errors with source location tracking.
///
/// Two families live here. Programming faults (`InvalidStateTransition`,
/// `IndexOutOfRange`) mean a caller broke an operation's contract and are
/// always propagated. Everything else comes from an I/O boundary and is
/// recoverable: the state is left as it was and the process keeps running.
#[derive(Error, Debug)]
pub enum MemoError {
    /// Capture operation requested from a state that does not allow it.
    #[error("Cannot {attempted} while {from} {location}")]
    InvalidStateTransition {
        /// Capture state at the time of the call.
        from: CaptureState,
        /// Operation that was attempted.
        attempted: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Catalog position does not exist.
    #[error("Index {index} out of range for catalog of {len} entries {location}")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Catalog length at the time of the call.
        len: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture subsystem failed (permission query, configuration, start or finalize).
    #[error("Capture error: {reason} {location}")]
    Capture {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback subsystem failed.
    #[error("Playback error: {reason} {location}")]
    Playback {
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Key-value store read or write failed.
    #[error("Storage error: {reason} {location}")]
    Storage {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Catalog document could not be encoded or decoded.
    #[error("Serialization error: {source} {location}")]
    Serialization {
        /// Underlying error from serde_json.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A state channel lost all of its senders.
    #[error("State channel closed {location}")]
    ChannelClosed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl MemoError {
    /// True for caller contract violations, false for recoverable I/O failures.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            MemoError::InvalidStateTransition { .. } | MemoError::IndexOutOfRange { .. }
        )
    }
}

/// Result type alias using [`MemoError`].
pub type Result<T> = std::result::Result<T, MemoError>;
