//! Presentation-facing facade over the capture session and the catalog.
//!
//! The presentation layer sends intents through [`MemoScreen`] and renders
//! from [`ScreenState`] snapshots. I/O failures stop here: they are logged
//! and turned into a status message. Only caller contract violations
//! (invalid state transition, index out of range) come back as `Err`.

use crate::{
    CaptureDevice, CaptureSession, CaptureState, CatalogStore, CatalogView, ClipEntry, CoreResult,
    MemoError, Playback, StartOutcome, storage::KeyValueStore,
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Shown when the user refuses microphone access.
pub const PERMISSION_REQUIRED_MESSAGE: &str =
    "Please grant permission to app to access microphone";

/// Shown when the capture subsystem fails to start.
pub const START_FAILED_MESSAGE: &str = "Recording could not be started";

/// Shown when a finished recording could not be finalized.
pub const STOP_FAILED_MESSAGE: &str = "Recording could not be finalized";

/// Shown when the catalog could not be written to storage.
pub const SAVE_FAILED_MESSAGE: &str = "Recordings could not be saved";

/// Shown when a clip could not be played.
pub const PLAY_FAILED_MESSAGE: &str = "Recording could not be played";

/// Name input and status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptState {
    /// Current value of the name field.
    pub name_input: String,
    /// User-visible status message, empty when none.
    pub message: String,
}

/// Everything the presentation layer renders, as one read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    /// Whether a recording is in progress.
    pub capture: CaptureState,
    /// User-visible status message, empty when none.
    pub message: String,
    /// Current value of the name field.
    pub name_input: String,
    /// Saved clips in creation order.
    pub clips: Vec<ClipEntry>,
    /// Position being renamed, if any.
    pub editing: Option<usize>,
}

impl ScreenState {
    fn assemble(capture: CaptureState, catalog: &CatalogView, prompt: &PromptState) -> Self {
        Self {
            capture,
            message: prompt.message.clone(),
            name_input: prompt.name_input.clone(),
            clips: catalog.clips.clone(),
            editing: catalog.editing,
        }
    }
}

/// Change subscription over every piece of screen state.
pub struct ScreenWatcher {
    capture: watch::Receiver<CaptureState>,
    catalog: watch::Receiver<CatalogView>,
    prompt: watch::Receiver<PromptState>,
}

impl ScreenWatcher {
    /// Waits until any part of the screen state changes.
    ///
    /// # Errors
    ///
    /// Returns `ChannelClosed` once the screen has been dropped.
    pub async fn changed(&mut self) -> CoreResult<()> {
        let result = tokio::select! {
            r = self.capture.changed() => r,
            r = self.catalog.changed() => r,
            r = self.prompt.changed() => r,
        };

        result.map_err(|_| MemoError::ChannelClosed {
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Latest state, marking every part as seen.
    pub fn snapshot(&mut self) -> ScreenState {
        let capture = *self.capture.borrow_and_update();
        let catalog = self.catalog.borrow_and_update().clone();
        let prompt = self.prompt.borrow_and_update().clone();
        ScreenState::assemble(capture, &catalog, &prompt)
    }
}

/// The recording screen's state and intents.
pub struct MemoScreen<D: CaptureDevice, P: Playback, S: KeyValueStore> {
    session: CaptureSession<D>,
    catalog: CatalogStore<S>,
    playback: P,
    prompt: watch::Sender<PromptState>,
}

impl<D: CaptureDevice, P: Playback, S: KeyValueStore> MemoScreen<D, P, S> {
    /// Creates an idle screen with an empty catalog stored under `catalog_key`.
    ///
    /// Call [`MemoScreen::load`] once before accepting intents.
    pub fn new(device: D, playback: P, store: S, catalog_key: impl Into<String>) -> Self {
        let (prompt, _) = watch::channel(PromptState::default());
        Self {
            session: CaptureSession::new(device),
            catalog: CatalogStore::new(store, catalog_key),
            playback,
            prompt,
        }
    }

    /// The capture session controller.
    pub fn session(&self) -> &CaptureSession<D> {
        &self.session
    }

    /// The catalog store.
    pub fn catalog(&self) -> &CatalogStore<S> {
        &self.catalog
    }

    /// Current state of the whole screen.
    pub fn snapshot(&self) -> ScreenState {
        let capture = self.session.state();
        let catalog = self.catalog.snapshot();
        let prompt = self.prompt.borrow();
        ScreenState::assemble(capture, &catalog, &prompt)
    }

    /// Subscribes to screen state changes.
    pub fn subscribe(&self) -> ScreenWatcher {
        ScreenWatcher {
            capture: self.session.subscribe(),
            catalog: self.catalog.subscribe(),
            prompt: self.prompt.subscribe(),
        }
    }

    /// Rehydrates the catalog from storage. Never fails: an unreadable
    /// catalog is logged and the screen starts empty.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        match self.catalog.load().await {
            Ok(count) => debug!(count, "Screen ready"),
            Err(e) => error!(error = ?e, "Failed to load saved recordings, starting empty"),
        }
    }

    /// Updates the name field.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.prompt.send_modify(|prompt| prompt.name_input = name);
    }

    /// Starts recording.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if a recording is already running.
    #[instrument(skip(self))]
    pub async fn start_capture(&mut self) -> CoreResult<()> {
        match self.session.start().await? {
            StartOutcome::Capturing { session_id } => {
                debug!(session_id = %session_id, "Screen capturing");
                self.set_message("");
            }
            StartOutcome::PermissionDenied => self.set_message(PERMISSION_REQUIRED_MESSAGE),
            StartOutcome::Failed(_) => self.set_message(START_FAILED_MESSAGE),
        }
        Ok(())
    }

    /// Stops recording, saves the clip under the current name, and clears
    /// the name field.
    ///
    /// The typed name is kept as entered. A blank or whitespace-only name
    /// falls back to `Recording {n}`, `n` being the clip's 1-based position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if nothing is being recorded.
    #[instrument(skip(self))]
    pub async fn stop_capture(&mut self) -> CoreResult<()> {
        let name = {
            let prompt = self.prompt.borrow();
            if prompt.name_input.trim().is_empty() {
                format!("Recording {}", self.catalog.len() + 1)
            } else {
                prompt.name_input.clone()
            }
        };

        let entry = match self.session.stop(name).await {
            Ok(entry) => entry,
            Err(e) => return self.absorb(Err(e), STOP_FAILED_MESSAGE),
        };

        self.prompt
            .send_modify(|prompt| prompt.name_input.clear());

        info!(name = %entry.name, duration = %entry.duration_label, "Recording saved");

        let result = self.catalog.append(entry).await;
        self.absorb(result, SAVE_FAILED_MESSAGE)
    }

    /// Puts the clip at `index` in edit.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    pub fn begin_edit(&mut self, index: usize) -> CoreResult<()> {
        self.catalog.begin_edit(index)
    }

    /// Leaves edit mode without renaming.
    pub fn cancel_edit(&mut self) {
        self.catalog.cancel_edit();
    }

    /// Renames the clip in edit and leaves edit mode. Does nothing when no
    /// clip is in edit.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the clip in edit no longer exists.
    #[instrument(skip(self))]
    pub async fn save_edit(&mut self, new_name: String) -> CoreResult<()> {
        let Some(index) = self.catalog.editing() else {
            warn!("Save requested with no clip in edit");
            return Ok(());
        };
        self.rename(index, new_name).await
    }

    /// Renames the clip at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    #[instrument(skip(self))]
    pub async fn rename(&mut self, index: usize, new_name: String) -> CoreResult<()> {
        let result = self.catalog.rename(index, new_name).await;
        self.absorb(result, SAVE_FAILED_MESSAGE)
    }

    /// Deletes the clip at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, index: usize) -> CoreResult<()> {
        let result = self.catalog.delete(index).await;
        self.absorb(result, SAVE_FAILED_MESSAGE)
    }

    /// Plays the clip at `index`.
    ///
    /// Clips loaded from storage carry no playable handle. One is rebuilt
    /// from the source locator on first play and kept for later plays.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    #[instrument(skip(self))]
    pub fn play(&mut self, index: usize) -> CoreResult<()> {
        let view = self.catalog.snapshot();
        let Some(entry) = view.clips.get(index) else {
            return Err(MemoError::IndexOutOfRange {
                index,
                len: view.clips.len(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let handle = match &entry.playable {
            Some(handle) => handle.clone(),
            None => match self.playback.rehydrate(&entry.source) {
                Ok(handle) => {
                    self.catalog.attach_playable(index, handle.clone())?;
                    debug!(index, source = %entry.source, "Playable handle rehydrated");
                    handle
                }
                Err(e) => return self.absorb(Err(e), PLAY_FAILED_MESSAGE),
            },
        };

        let result = self.playback.play(&handle);
        self.absorb(result, PLAY_FAILED_MESSAGE)
    }

    fn set_message(&self, message: &str) {
        self.prompt.send_if_modified(|prompt| {
            if prompt.message == message {
                return false;
            }
            prompt.message = message.to_string();
            true
        });
    }

    /// Passes faults through; logs recoverable failures and shows `message`.
    fn absorb(&self, result: CoreResult<()>, message: &str) -> CoreResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fault() => Err(e),
            Err(e) => {
                warn!(error = ?e, message, "Recoverable failure");
                self.set_message(message);
                Ok(())
            }
        }
    }
}
