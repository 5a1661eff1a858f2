//! Parameter value variants and kind resolution.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kestrel_core::{DbKind, SqlValue, ToSqlValue, ValueTag};

use crate::error::{BindError, Result};
use crate::sink::ProviderParam;

/// The value carried by a declared parameter.
///
/// The variant is explicit rather than sniffed from the value at bind time:
/// lists expand into IN-clause parameters, scalars bind directly, and custom
/// values are written by their registered [`TypeHandler`].
#[derive(Clone)]
pub enum ParamValue {
    /// A single bindable value.
    Scalar(SqlValue),
    /// An enumerable of scalars, expanded into one parameter per element.
    List(Vec<SqlValue>),
    /// An opaque value owned entirely by a registered handler.
    Custom {
        /// The value's type, the handler registry key.
        type_id: TypeId,
        /// The value's type name, for error messages.
        type_name: &'static str,
        /// The value itself.
        value: Arc<dyn Any + Send + Sync>,
    },
}

impl ParamValue {
    /// Wraps a list of scalars.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Wraps a handler-owned value.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }
}

impl<T: ToSqlValue> From<T> for ParamValue {
    fn from(value: T) -> Self {
        Self::Scalar(value.to_sql_value())
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Custom { type_name, .. } => {
                f.debug_struct("Custom").field("type_name", type_name).finish()
            }
        }
    }
}

/// Writes a handler-owned value into a provider parameter.
///
/// The handler fully owns the write: value, kind, size, everything. The
/// binder never inspects a custom value itself.
pub trait TypeHandler: Send + Sync {
    /// Populates `param` from the value.
    fn set_value(&self, param: &mut ProviderParam, value: &(dyn Any + Send + Sync)) -> Result<()>;
}

/// Maps runtime values to provider parameter kinds.
///
/// Resolution order: an explicit per-parameter kind wins, then a registered
/// handler for the value's type, then the structural mapping table. Lists
/// always resolve to [`DbKind::Multi`]; NULL scalars resolve untyped.
pub struct TypeResolver {
    mappings: HashMap<ValueTag, DbKind>,
    handlers: HashMap<TypeId, Arc<dyn TypeHandler>>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert(ValueTag::Bool, DbKind::Boolean);
        mappings.insert(ValueTag::Int, DbKind::Int64);
        mappings.insert(ValueTag::Float, DbKind::Float64);
        mappings.insert(ValueTag::Text, DbKind::Text);
        mappings.insert(ValueTag::Blob, DbKind::Binary);
        mappings.insert(ValueTag::Date, DbKind::Date);
        mappings.insert(ValueTag::Timestamp, DbKind::Timestamp);
        Self {
            mappings,
            handlers: HashMap::new(),
        }
    }
}

impl TypeResolver {
    /// Overrides the kind a value tag maps to.
    pub fn set_mapping(&mut self, tag: ValueTag, kind: DbKind) {
        self.mappings.insert(tag, kind);
    }

    /// Registers a handler for values of type `T`.
    pub fn register_handler<T: Any>(&mut self, handler: Arc<dyn TypeHandler>) {
        self.handlers.insert(TypeId::of::<T>(), handler);
    }

    /// The registered handler for a type, if any.
    #[must_use]
    pub fn handler_for(&self, type_id: TypeId) -> Option<Arc<dyn TypeHandler>> {
        self.handlers.get(&type_id).map(Arc::clone)
    }

    /// Resolves the kind for a scalar value. `None` means bind untyped.
    pub fn resolve_scalar(&self, value: &SqlValue) -> Result<Option<DbKind>> {
        match value.tag() {
            None => Ok(None),
            Some(tag) => self.mappings.get(&tag).copied().map(Some).ok_or_else(|| {
                BindError::UnmappableType(String::from(value.kind_name()))
            }),
        }
    }

    /// Resolves the kind for a declared value.
    pub fn resolve(&self, value: &ParamValue) -> Result<Option<DbKind>> {
        match value {
            ParamValue::Scalar(v) => self.resolve_scalar(v),
            ParamValue::List(_) => Ok(Some(DbKind::Multi)),
            ParamValue::Custom {
                type_id, type_name, ..
            } => {
                if self.handlers.contains_key(type_id) {
                    // The handler owns the write; no kind to resolve here.
                    Ok(None)
                } else {
                    Err(BindError::UnmappableType(String::from(*type_name)))
                }
            }
        }
    }
}
