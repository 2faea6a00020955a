mod config;
mod logging_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    config::Config, logging_config::LoggingConfig, recording_config::RecordingConfig,
    storage_config::StorageConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;
use voice_memo_core::DEFAULT_CATALOG_KEY;

pub(crate) const DEFAULT_LOG_FILTER: &str = "voice_memo=info,voice_memo_core=info";

/// Fallback data directory when the platform has no home directory.
const FALLBACK_DATA_DIR: &str = "voice-memo-data";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "voice-memo", "Voice-Memo")
}

pub(crate) fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

pub(crate) fn default_recordings_dir() -> PathBuf {
    default_data_dir().join("recordings")
}

pub(crate) fn default_catalog_key() -> String {
    DEFAULT_CATALOG_KEY.to_string()
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
