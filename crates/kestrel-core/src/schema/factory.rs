//! Schema factory with the per-type schema cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{ConditionsSchema, DefaultTableNameConvention, Entity, TableNameConvention, TableSchema};
use crate::error::{CoreError, Result};
use crate::value::SqlValue;

/// Resolves entity types into cached, immutable [`TableSchema`] values.
///
/// The first call for a type builds the schema from [`Entity::describe`];
/// every later call returns the shared instance without touching the
/// definition again. The cache follows the many-readers/one-builder policy:
/// lookups take a read lock, a miss re-checks under the write lock so a
/// schema is built at most once, and the published `Arc` is immutable.
pub struct SchemaFactory {
    convention: Arc<dyn TableNameConvention>,
    cache: RwLock<HashMap<TypeId, Arc<TableSchema>>>,
}

impl Default for SchemaFactory {
    fn default() -> Self {
        Self::new(Arc::new(DefaultTableNameConvention))
    }
}

impl SchemaFactory {
    /// Creates a factory using the given table naming convention.
    pub fn new(convention: Arc<dyn TableNameConvention>) -> Self {
        Self {
            convention,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached schema for `T`, building it on first use.
    pub fn get_table_schema<T: Entity>(&self) -> Arc<TableSchema> {
        let key = TypeId::of::<T>();
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(schema) = cache.get(&key) {
                return Arc::clone(schema);
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = cache.get(&key) {
            return Arc::clone(schema);
        }

        let def = T::describe();
        let table_name = self.convention.table_name(&def);
        debug!(entity = def.type_name(), table = %table_name, "building table schema");
        let schema = Arc::new(def.into_schema(table_name));
        cache.insert(key, Arc::clone(&schema));
        schema
    }

    /// Derives a conditions schema from a filter object's members.
    ///
    /// Members may use either the persisted column name or the mapped
    /// property name; anything else is a configuration error. Built fresh
    /// per call, in declared-member order.
    pub fn get_conditions_schema(
        &self,
        schema: &TableSchema,
        members: &[(String, SqlValue)],
    ) -> Result<ConditionsSchema> {
        let mut conditions = ConditionsSchema::default();
        for (member, value) in members {
            let column = schema.find_column(member).ok_or_else(|| {
                CoreError::Configuration(format!(
                    "condition member {member} matches no column of table {}",
                    schema.name()
                ))
            })?;
            conditions.push(member.clone(), column.clone(), value.clone());
        }
        Ok(conditions)
    }
}
