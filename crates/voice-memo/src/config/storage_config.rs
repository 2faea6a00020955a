use crate::config::{default_catalog_key, default_data_dir};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Catalog persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the key-value store files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key the catalog document is stored under.
    #[serde(default = "default_catalog_key")]
    pub catalog_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_key: default_catalog_key(),
        }
    }
}
