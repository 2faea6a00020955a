//! Playback through the operating system's default audio handler.

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tracing::{info, instrument};
use voice_memo_core::{CoreResult, MemoError, PlayableHandle, Playback, SourceLocator};

/// Plays recordings by handing their file to the OS default player.
#[derive(Debug, Default)]
pub struct SystemPlayer;

impl Playback for SystemPlayer {
    #[instrument(skip(self))]
    fn play(&self, handle: &PlayableHandle) -> CoreResult<()> {
        let path = handle
            .downcast_ref::<PathBuf>()
            .ok_or_else(|| MemoError::Playback {
                reason: "Handle does not refer to a file".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        open::that_detached(path).map_err(|e| MemoError::Playback {
            reason: format!("Failed to open {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, "Playback started");

        Ok(())
    }

    #[instrument(skip(self))]
    fn rehydrate(&self, source: &SourceLocator) -> CoreResult<PlayableHandle> {
        let path = PathBuf::from(source.as_str());

        if !path.is_file() {
            return Err(MemoError::Playback {
                reason: format!("Recording not found at {:?}", path),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(PlayableHandle::new(path))
    }
}
