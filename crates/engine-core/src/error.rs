use connectors::error::ConnectorError;
use model::pagination::error::CursorError;
use planner::query::sort::{SortError, SortSpec};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrollError {
    #[error("Scrolling supports a single sort field, got: {}", fields.join(", "))]
    MultipleSortFields { fields: Vec<String> },

    #[error("Cursor sort {cursor} does not match query sort {query}")]
    MismatchedSortFields { cursor: SortSpec, query: SortSpec },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    #[error("Unknown sort field '{field}' on entity '{entity}'")]
    UnknownField { field: String, entity: String },

    #[error("Cannot scroll on sort expression: {0}")]
    UnsupportedSortExpression(String),

    #[error("Query has no FROM entity")]
    MissingEntity,

    /// Raised by the record source; passed through untouched.
    #[error(transparent)]
    Source(#[from] ConnectorError),
}

impl From<SortError> for ScrollError {
    fn from(err: SortError) -> Self {
        match err {
            SortError::MultipleSortFields { fields } => ScrollError::MultipleSortFields { fields },
            SortError::MismatchedSortFields { cursor, query } => {
                ScrollError::MismatchedSortFields { cursor, query }
            }
            SortError::UnsupportedSortExpression(expr) => {
                ScrollError::UnsupportedSortExpression(expr)
            }
        }
    }
}
