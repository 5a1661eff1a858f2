//! Provider-neutral parameter kinds.

use crate::value::SqlValue;

/// A provider-neutral parameter kind.
///
/// Dialects map kinds to concrete column types; the binder uses them to tag
/// parameters without knowing anything about the backend driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbKind {
    /// Boolean.
    Boolean,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Fixed-precision decimal.
    Decimal,
    /// Unicode text.
    Text,
    /// Binary blob.
    Binary,
    /// Calendar date.
    Date,
    /// Date and time.
    Timestamp,
    /// Marker for an enumerable-of-scalars value. Never bound as a single
    /// parameter; the binder expands it into an IN-clause list instead.
    Multi,
}

/// Structural tag of a `SqlValue`, the key of the default kind mapping
/// table. `Null` values carry no tag; they bind untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// Boolean values.
    Bool,
    /// Integer values.
    Int,
    /// Float values.
    Float,
    /// Text values.
    Text,
    /// Blob values.
    Blob,
    /// Date values.
    Date,
    /// Timestamp values.
    Timestamp,
}

impl SqlValue {
    /// Returns the structural tag of this value, or `None` for NULL.
    #[must_use]
    pub fn tag(&self) -> Option<ValueTag> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueTag::Bool),
            Self::Int(_) => Some(ValueTag::Int),
            Self::Float(_) => Some(ValueTag::Float),
            Self::Text(_) => Some(ValueTag::Text),
            Self::Blob(_) => Some(ValueTag::Blob),
            Self::Date(_) => Some(ValueTag::Date),
            Self::Timestamp(_) => Some(ValueTag::Timestamp),
        }
    }
}
