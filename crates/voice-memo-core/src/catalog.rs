//! Ordered clip catalog mirrored to a key-value store.
//!
//! The in-memory list lives in a `watch` channel: every mutation is applied
//! and published synchronously, and only then is the full document written
//! to the store. Readers therefore always see the latest list, even while a
//! write is still in flight.

use crate::{ClipEntry, CoreResult, MemoError, PlayableHandle, storage::KeyValueStore};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Key the catalog document is stored under unless configured otherwise.
pub const DEFAULT_CATALOG_KEY: &str = "recordings";

/// Snapshot of the catalog and its editing cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    /// Clips in creation order.
    pub clips: Vec<ClipEntry>,
    /// Position of the entry being renamed, if any. Never persisted.
    pub editing: Option<usize>,
}

/// Single source of truth for the saved clip list.
pub struct CatalogStore<S: KeyValueStore> {
    store: S,
    key: String,
    view: watch::Sender<CatalogView>,
}

impl<S: KeyValueStore> CatalogStore<S> {
    /// Creates an empty catalog persisted under `key`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        let (view, _) = watch::channel(CatalogView::default());
        Self {
            store,
            key: key.into(),
            view,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current clips and cursor.
    pub fn snapshot(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Receiver that observes every catalog change.
    pub fn subscribe(&self) -> watch::Receiver<CatalogView> {
        self.view.subscribe()
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.view.borrow().clips.len()
    }

    /// True when there are no clips.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position currently in edit.
    pub fn editing(&self) -> Option<usize> {
        self.view.borrow().editing
    }

    /// Replaces the in-memory catalog with the persisted one.
    ///
    /// A missing document is an empty catalog. On a read failure or an
    /// unreadable document the catalog is left empty and the error is
    /// returned for the caller to log; startup carries on either way.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&mut self) -> CoreResult<usize> {
        self.view.send_replace(CatalogView::default());

        let Some(document) = self.store.get(&self.key).await? else {
            info!("No saved catalog, starting empty");
            return Ok(0);
        };

        let clips: Vec<ClipEntry> =
            serde_json::from_str(&document).map_err(|e| MemoError::Serialization {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let count = clips.len();
        self.view.send_replace(CatalogView {
            clips,
            editing: None,
        });

        info!(count, "Catalog loaded");

        Ok(count)
    }

    /// Adds `entry` at the end and persists.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails. The entry stays in
    /// memory and is written with the next successful mutation.
    #[instrument(skip(self, entry), fields(name = %entry.name))]
    pub async fn append(&mut self, entry: ClipEntry) -> CoreResult<()> {
        self.view.send_modify(|view| view.clips.push(entry));
        debug!(len = self.len(), "Clip appended");
        self.persist().await
    }

    /// Renames the entry at `index`, clears the editing cursor, and persists.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` without touching anything if `index` does
    /// not exist, or the store's error if the write fails.
    #[instrument(skip(self))]
    pub async fn rename(&mut self, index: usize, new_name: String) -> CoreResult<()> {
        self.check_index(index)?;
        self.view.send_modify(|view| {
            view.clips[index].name = new_name;
            view.editing = None;
        });
        debug!(index, "Clip renamed");
        self.persist().await
    }

    /// Removes the entry at `index`, shifting later entries down, and persists.
    ///
    /// An editing cursor on the removed entry is cleared; one on a later
    /// entry moves with it.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogStore::rename`].
    #[instrument(skip(self))]
    pub async fn delete(&mut self, index: usize) -> CoreResult<()> {
        self.check_index(index)?;
        self.view.send_modify(|view| {
            view.clips.remove(index);
            view.editing = match view.editing {
                Some(cursor) if cursor == index => None,
                Some(cursor) if cursor > index => Some(cursor - 1),
                other => other,
            };
        });
        debug!(index, len = self.len(), "Clip deleted");
        self.persist().await
    }

    /// Puts the entry at `index` in edit. In-memory only.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    #[track_caller]
    pub fn begin_edit(&mut self, index: usize) -> CoreResult<()> {
        self.check_index(index)?;
        self.view.send_modify(|view| view.editing = Some(index));
        Ok(())
    }

    /// Leaves edit mode without renaming.
    pub fn cancel_edit(&mut self) {
        self.view.send_if_modified(|view| view.editing.take().is_some());
    }

    /// Caches a playable handle on the in-memory entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` does not exist.
    #[track_caller]
    pub fn attach_playable(&mut self, index: usize, handle: PlayableHandle) -> CoreResult<()> {
        self.check_index(index)?;
        self.view
            .send_modify(|view| view.clips[index].playable = Some(handle));
        Ok(())
    }

    /// Writes the full catalog document to the store.
    async fn persist(&self) -> CoreResult<()> {
        let document = {
            let view = self.view.borrow();
            serde_json::to_string(&view.clips).map_err(|e| MemoError::Serialization {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?
        };

        self.store
            .set(&self.key, document)
            .await
            .inspect_err(|e| error!(key = %self.key, error = ?e, "Failed to persist catalog"))
    }

    #[track_caller]
    fn check_index(&self, index: usize) -> CoreResult<()> {
        let len = self.len();
        if index >= len {
            warn!(index, len, "Catalog index out of range");
            return Err(MemoError::IndexOutOfRange {
                index,
                len,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }
}
