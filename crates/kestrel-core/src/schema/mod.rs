//! Table schema model.
//!
//! Entities describe their persisted shape once through the [`Entity`]
//! trait; the [`SchemaFactory`](factory::SchemaFactory) resolves that
//! description into an immutable [`TableSchema`] and caches it per type.

mod factory;
mod naming;

pub use factory::SchemaFactory;
pub use naming::{DefaultTableNameConvention, NonPluralizingTableNameConvention, TableNameConvention};

use crate::error::{CoreError, Result};
use crate::types::DbKind;
use crate::value::SqlValue;

/// How a column's value comes into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGeneration {
    /// Plain client-supplied column.
    None,
    /// Server-assigned identity. Omitted from inserts.
    AutoIncrement,
    /// Server-assigned on write (e.g. a creation timestamp). Omitted from
    /// inserts, but may legitimately change afterwards so updates include it.
    Generated,
    /// Derived by the database. Never written.
    Computed,
}

/// Immutable description of a single column.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    column_name: String,
    property_name: String,
    ordinal: usize,
    kind: DbKind,
    is_primary_key: bool,
    generation: ColumnGeneration,
}

impl ColumnSchema {
    /// The persisted column name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// The external (mapped) name. Equal to the column name when the column
    /// is not aliased. Parameters are always named after this.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Declaration-order position.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The provider-neutral parameter kind.
    #[must_use]
    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// Whether the column is part of the primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    /// How the column's value is generated.
    #[must_use]
    pub fn generation(&self) -> ColumnGeneration {
        self.generation
    }

    /// Whether the persisted name differs from the external name.
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.column_name != self.property_name
    }

    /// Whether the column appears in INSERT column lists. Explicitly
    /// client-supplied keys are insertable; server-assigned and computed
    /// columns are not.
    #[must_use]
    pub fn is_insertable(&self) -> bool {
        self.generation == ColumnGeneration::None
    }

    /// Whether the column appears in UPDATE SET lists. Keys and computed
    /// columns never do; generated columns do.
    #[must_use]
    pub fn is_updatable(&self) -> bool {
        !self.is_primary_key && self.generation != ColumnGeneration::Computed
    }

    fn matches(&self, member: &str) -> bool {
        self.column_name.eq_ignore_ascii_case(member)
            || self.property_name.eq_ignore_ascii_case(member)
    }
}

/// Immutable description of a table: name plus columns in declaration order.
///
/// Owned and cached by the [`SchemaFactory`]; built exactly once per entity
/// type and shared read-only thereafter.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// The raw (unquoted) table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// The primary key columns, in declaration order. Empty for keyless
    /// schemas.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&ColumnSchema> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    /// Columns included in INSERT statements.
    #[must_use]
    pub fn insertable_columns(&self) -> Vec<&ColumnSchema> {
        self.columns.iter().filter(|c| c.is_insertable()).collect()
    }

    /// Columns included in UPDATE SET lists.
    #[must_use]
    pub fn updatable_columns(&self) -> Vec<&ColumnSchema> {
        self.columns.iter().filter(|c| c.is_updatable()).collect()
    }

    /// The primary key columns, or a configuration error naming the
    /// operation that required them.
    pub fn require_primary_key(&self, operation: &str) -> Result<Vec<&ColumnSchema>> {
        let keys = self.primary_key_columns();
        if keys.is_empty() {
            return Err(CoreError::Configuration(format!(
                "{operation} requires a primary key, but table {} declares no key columns",
                self.name
            )));
        }
        Ok(keys)
    }

    /// Finds a column by persisted name or external name, case-insensitive.
    #[must_use]
    pub fn find_column(&self, member: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.matches(member))
    }
}

/// One resolved condition: a column to compare and the parameter carrying
/// the comparison value. A null value marks an IS NULL condition.
#[derive(Debug, Clone)]
pub struct ConditionColumn {
    parameter_name: String,
    column: ColumnSchema,
    value: SqlValue,
}

impl ConditionColumn {
    /// The parameter name, as given by the filter member.
    #[must_use]
    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// The resolved column.
    #[must_use]
    pub fn column(&self) -> &ColumnSchema {
        &self.column
    }

    /// Whether this is an IS NULL condition.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value == SqlValue::Null
    }
}

/// Conditions derived from a filter object's shape, in declared-member
/// order. Built fresh per call; only the underlying [`TableSchema`] is
/// cached.
#[derive(Debug, Clone, Default)]
pub struct ConditionsSchema {
    entries: Vec<ConditionColumn>,
}

impl ConditionsSchema {
    /// The resolved conditions, in declared-member order.
    #[must_use]
    pub fn entries(&self) -> &[ConditionColumn] {
        &self.entries
    }

    /// Whether there are no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The parameters a command built from these conditions needs. IS NULL
    /// conditions contribute no parameter.
    #[must_use]
    pub fn parameters(&self) -> Vec<(String, SqlValue)> {
        self.entries
            .iter()
            .filter(|e| !e.is_null())
            .map(|e| (e.parameter_name.clone(), e.value.clone()))
            .collect()
    }

    pub(crate) fn push(&mut self, parameter_name: String, column: ColumnSchema, value: SqlValue) {
        self.entries.push(ConditionColumn {
            parameter_name,
            column,
            value,
        });
    }
}

/// Static structural description an entity type exposes.
///
/// This is the explicit registration step that replaces runtime reflection:
/// each entity declares its columns once, and the factory turns the
/// declaration into a cached [`TableSchema`].
#[derive(Debug, Clone)]
pub struct EntityDef {
    type_name: &'static str,
    table_name: Option<String>,
    columns: Vec<ColumnDef>,
}

impl EntityDef {
    /// Starts a definition for the named entity type.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table_name: None,
            columns: Vec::new(),
        }
    }

    /// Overrides the table name. Beats any naming convention.
    #[must_use]
    pub fn table(mut self, name: &str) -> Self {
        self.table_name = Some(String::from(name));
        self
    }

    /// Adds a column declaration.
    #[must_use]
    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    /// The entity type's own name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The explicit table name override, if any.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub(crate) fn into_schema(self, table_name: String) -> TableSchema {
        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(ordinal, def)| ColumnSchema {
                column_name: def.column.unwrap_or_else(|| def.property.clone()),
                property_name: def.property,
                ordinal,
                kind: def.kind,
                is_primary_key: def.primary_key,
                generation: def.generation,
            })
            .collect();
        TableSchema {
            name: table_name,
            columns,
        }
    }
}

/// Declaration of one column within an [`EntityDef`].
#[derive(Debug, Clone)]
pub struct ColumnDef {
    property: String,
    column: Option<String>,
    kind: DbKind,
    primary_key: bool,
    generation: ColumnGeneration,
}

impl ColumnDef {
    /// Declares a column whose persisted name equals the property name.
    #[must_use]
    pub fn new(property: &str, kind: DbKind) -> Self {
        Self {
            property: String::from(property),
            column: None,
            kind,
            primary_key: false,
            generation: ColumnGeneration::None,
        }
    }

    /// Gives the column a persisted name distinct from the property name.
    /// SELECT lists render `column AS property`; parameters keep the
    /// property name.
    #[must_use]
    pub fn named(mut self, column: &str) -> Self {
        self.column = Some(String::from(column));
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as a server-assigned identity.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.generation = ColumnGeneration::AutoIncrement;
        self
    }

    /// Marks the column as server-generated on write.
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generation = ColumnGeneration::Generated;
        self
    }

    /// Marks the column as computed by the database.
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.generation = ColumnGeneration::Computed;
        self
    }
}

/// Capability an entity type exposes so the factory can build its schema.
pub trait Entity: 'static {
    /// Returns the static structural description of this entity.
    fn describe() -> EntityDef;
}
