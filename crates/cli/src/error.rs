use connectors::error::ConnectorError;
use engine_config::error::SettingsError;
use engine_core::error::ScrollError;
use model::pagination::error::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load scroll settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to load the data file: {0}")]
    Source(#[from] ConnectorError),

    #[error("Scroll failed: {0}")]
    Scroll(#[from] ScrollError),

    #[error("Invalid cursor: {0}")]
    Cursor(#[from] CursorError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid argument `{arg}`: {message}")]
    InvalidArgument { arg: &'static str, message: String },
}

impl CliError {
    pub fn invalid(arg: &'static str, message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            arg,
            message: message.into(),
        }
    }
}
