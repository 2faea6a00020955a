//! Directory-backed key-value store.
//!
//! Each key maps to one file in the store directory. Writes go through a
//! temporary file that is synced and renamed over the target, so a crash
//! mid-write leaves the previous value in place.

use crate::{CoreResult, MemoError, storage::KeyValueStore};

use std::{
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// Extension of the file holding a key's value.
const VALUE_EXTENSION: &str = "json";

/// Extension of the in-flight temporary file.
const TEMP_EXTENSION: &str = "json.tmp";

/// Key-value store persisted as one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[track_caller]
    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.chars().any(char::is_control);

        if !valid {
            return Err(MemoError::Storage {
                reason: format!("Invalid store key: {key:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(contents) => {
                debug!(path = ?path, bytes = contents.len(), "Value read");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MemoError::Storage {
                reason: format!("Failed to read {path:?}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String) -> CoreResult<()> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MemoError::Storage {
                reason: format!("Failed to create store directory {:?}: {e}", self.dir),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let temp_path = path.with_extension(TEMP_EXTENSION);

        let written = match write_temp(&temp_path, &value).await {
            Ok(()) => fs::rename(&temp_path, &path)
                .await
                .map_err(|e| MemoError::Storage {
                    reason: format!("Failed to rename temp file to final: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                }),
            Err(e) => Err(e),
        };

        if written.is_err() {
            remove_temp(&temp_path).await;
        }
        written?;

        info!(path = ?path, bytes = value.len(), "Value stored (atomic write)");

        Ok(())
    }
}

async fn write_temp(temp_path: &Path, value: &str) -> CoreResult<()> {
    let mut temp_file = fs::File::create(temp_path)
        .await
        .map_err(|e| MemoError::Storage {
            reason: format!("Failed to create temp file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    temp_file
        .write_all(value.as_bytes())
        .await
        .map_err(|e| MemoError::Storage {
            reason: format!("Failed to write temp file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    temp_file.sync_all().await.map_err(|e| MemoError::Storage {
        reason: format!("Failed to sync temp file: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Removes a temp file left by a failed write. The stored value is untouched.
async fn remove_temp(temp_path: &Path) {
    match fs::remove_file(temp_path).await {
        Ok(()) => debug!(path = ?temp_path, "Removed temp file after failed write"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?temp_path, error = %e, "Failed to remove temp file"),
    }
}
