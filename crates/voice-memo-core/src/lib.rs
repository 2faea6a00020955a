//! Voice Memo Core Library
//!
//! Recording lifecycle and clip catalog for a voice memo screen: a capture
//! session state machine, an ordered catalog persisted to a key-value
//! store, and a presentation-facing facade that ties them together.
//!
//! Capture, playback and storage are collaborators behind the
//! [`CaptureDevice`], [`Playback`] and [`KeyValueStore`] traits.
//!
//! # Example
//!
//! ```no_run
//! use voice_memo_core::{
//!     CaptureDevice, CoreResult, DEFAULT_CATALOG_KEY, FileStore, MemoScreen, Playback,
//! };
//!
//! async fn record<D: CaptureDevice, P: Playback>(device: D, player: P) -> CoreResult<()> {
//!     let store = FileStore::new("data");
//!     let mut screen = MemoScreen::new(device, player, store, DEFAULT_CATALOG_KEY);
//!     screen.load().await;
//!
//!     screen.set_name("memo1");
//!     screen.start_capture().await?;
//!     screen.stop_capture().await?;
//!
//!     for clip in screen.snapshot().clips {
//!         println!("{} - {}", clip.name, clip.duration_label);
//!     }
//!     Ok(())
//! }
//! ```

mod capture;
mod catalog;
mod clip;
mod duration;
mod error;
mod playback;
mod screen;
mod storage;

pub use {
    capture::{
        CaptureDevice, CaptureHandle, CaptureSession, CaptureState, FinishedCapture, Permission,
        StartOutcome,
    },
    catalog::{CatalogStore, CatalogView, DEFAULT_CATALOG_KEY},
    clip::{ClipEntry, PlayableHandle, SourceLocator},
    duration::format_duration,
    error::{MemoError, Result as CoreResult},
    playback::Playback,
    screen::{
        MemoScreen, PERMISSION_REQUIRED_MESSAGE, PLAY_FAILED_MESSAGE, PromptState,
        SAVE_FAILED_MESSAGE, START_FAILED_MESSAGE, STOP_FAILED_MESSAGE, ScreenState,
        ScreenWatcher,
    },
    storage::{FileStore, KeyValueStore, MemoryStore},
};

#[cfg(test)]
mod tests;
