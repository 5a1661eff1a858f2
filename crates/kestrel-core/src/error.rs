//! Error types for schema construction and SQL synthesis.

use thiserror::Error;

/// Errors raised while building schemas or synthesizing SQL.
///
/// None of these indicate transient conditions; they are surfaced
/// synchronously to the caller of the offending operation and are never
/// retried internally.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Schema misconfiguration, e.g. a key-requiring operation on a schema
    /// with no primary key columns, or a condition member that matches no
    /// column.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller misuse of a synthesis operation, e.g. an absent key value or
    /// a blank ordering expression on a paged query.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A runtime value has no provider parameter kind mapping.
    #[error("no parameter kind mapping for {0}")]
    UnmappableType(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
