use std::{any::Any, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable reference to a recorded audio resource (file path or URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocator(String);

impl SourceLocator {
    /// Wraps a path or URI.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// The locator as given by the capture subsystem.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, playback-ready recording produced by a capture or playback backend.
///
/// Cloning shares the underlying resource. Backends store whatever they need
/// inside and read it back with [`PlayableHandle::downcast_ref`].
#[derive(Clone)]
pub struct PlayableHandle {
    id: Uuid,
    inner: Arc<dyn Any + Send + Sync>,
}

impl PlayableHandle {
    /// Wraps a backend-specific resource.
    pub fn new<T: Any + Send + Sync>(resource: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            inner: Arc::new(resource),
        }
    }

    /// Identity of this handle, shared by its clones.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Borrows the wrapped resource if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for PlayableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayableHandle").field("id", &self.id).finish()
    }
}

/// One saved clip in the catalog.
///
/// Equality ignores `playable`, which is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipEntry {
    /// User-editable display name.
    pub name: String,
    /// Derived `minutes:seconds` label.
    pub duration_label: String,
    /// Where the audio lives. Immutable after creation.
    pub source: SourceLocator,
    /// Live handle from the capture that produced this entry, or from rehydration.
    #[serde(skip)]
    pub playable: Option<PlayableHandle>,
}

impl ClipEntry {
    /// Creates an entry for a freshly finalized capture.
    pub fn new(
        name: impl Into<String>,
        duration_label: impl Into<String>,
        source: SourceLocator,
        playable: Option<PlayableHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            duration_label: duration_label.into(),
            source,
            playable,
        }
    }
}

impl PartialEq for ClipEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.duration_label == other.duration_label
            && self.source == other.source
    }
}

impl Eq for ClipEntry {}
