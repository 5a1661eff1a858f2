//! Error types for parameter binding.

use kestrel_core::CoreError;
use thiserror::Error;

/// Errors raised while ingesting, binding or reading back parameters.
#[derive(Debug, Error)]
pub enum BindError {
    /// An error surfaced from schema or synthesis code.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A literal token resolved to a value that is not safe to splice into
    /// SQL text (text, blob or NULL).
    #[error("literal token {{={member}}} cannot splice a {kind} value")]
    UnsafeLiteral {
        /// The token's member name.
        member: String,
        /// The offending value kind.
        kind: &'static str,
    },

    /// A NULL value was read back into a non-optional type.
    #[error("parameter {0} is NULL; read it back through an Option")]
    NullCoercion(String),

    /// A value was read back as the wrong type.
    #[error("parameter {name} holds a {actual} value, not {expected}")]
    TypeMismatch {
        /// The parameter name.
        name: String,
        /// The requested kind.
        expected: &'static str,
        /// The kind actually held.
        actual: &'static str,
    },

    /// A readback or literal lookup named a parameter the bag does not hold.
    #[error("no parameter named {0}")]
    MissingParameter(String),

    /// Merging bags found the same explicit parameter name on both sides.
    #[error("parameter {0} is declared by both bags")]
    DuplicateParameter(String),

    /// A value's type has neither a kind mapping nor a registered handler.
    #[error("no type mapping or handler for {0}")]
    UnmappableType(String),

    /// A template did not serialize to a structured object.
    #[error("template is not a structured object: {0}")]
    Template(String),
}

/// Result type alias for binder operations.
pub type Result<T> = std::result::Result<T, BindError>;
