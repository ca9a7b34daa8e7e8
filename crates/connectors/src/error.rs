use thiserror::Error;

/// Errors raised by a record source while loading or executing a query.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Low‐level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The source cannot execute the query it was handed.
    #[error("Query error: {0}")]
    Query(String),

    #[error("Connector error: {0}")]
    Generic(String),
}
