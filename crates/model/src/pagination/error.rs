use crate::core::data_type::DataType;
use thiserror::Error;

/// Errors raised while decoding a cursor token or deriving a cursor from a record.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Malformed cursor token: {0}")]
    Malformed(String),

    #[error("Cursor token exceeds max length: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("Cannot coerce cursor value '{value}' to {data_type}")]
    Coercion { value: String, data_type: DataType },

    #[error("Fields of type {0} cannot be used to scroll")]
    UnsupportedType(DataType),

    #[error("Record has no value for identifier field '{0}'")]
    MissingTiebreak(String),

    #[error("Invalid base64 in cursor token: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid cursor payload: {0}")]
    Json(#[from] serde_json::Error),
}
