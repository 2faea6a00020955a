use crate::{CoreResult, PlayableHandle, SourceLocator};

/// Playback subsystem.
pub trait Playback {
    /// Starts playing a recording. Fire-and-forget: returns once playback
    /// has been handed off, not when it finishes.
    fn play(&self, handle: &PlayableHandle) -> CoreResult<()>;

    /// Rebuilds a playable handle from a persisted locator, for entries
    /// loaded from storage after a restart.
    fn rehydrate(&self, source: &SourceLocator) -> CoreResult<PlayableHandle>;
}
