use crate::config::default_recordings_dir;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Microphone capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Directory new WAV recordings are written to.
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: PathBuf,

    /// Input device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            recordings_dir: default_recordings_dir(),
            selected_device: None,
        }
    }
}
