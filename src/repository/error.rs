//! Error types for repository operations.

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for backing-store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query or write failed.
    #[error("Query error: {0}")]
    Query(String),

    /// A write conflicted with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
