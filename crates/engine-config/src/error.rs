use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when loading scroll settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting was present but unusable.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
