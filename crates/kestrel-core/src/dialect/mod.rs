//! SQL dialect support and statement synthesis.
//!
//! Every synthesis function is pure: `(schema, conditions?, ordering?,
//! paging?) -> SqlCommand`. The shared SQL assembly lives in the trait's
//! default bodies; each backend supplies only its syntax rules (identifier
//! quoting, top-N/paging clauses, identity retrieval, temp-table naming and
//! column types).

mod mssql;
mod postgres;
mod sqlite;

pub use mssql::MsSql2012Dialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::command::SqlCommand;
use crate::error::{CoreError, Result};
use crate::schema::{ColumnSchema, ConditionsSchema, TableSchema};
use crate::types::DbKind;
use crate::value::SqlValue;

/// A page request: 1-based page number and a positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u64,
    size: u64,
}

impl Page {
    /// Creates a page descriptor. Page numbers start at 1.
    pub fn new(number: u64, size: u64) -> Result<Self> {
        if number < 1 {
            return Err(CoreError::InvalidArgument(String::from(
                "page numbers start at 1",
            )));
        }
        if size < 1 {
            return Err(CoreError::InvalidArgument(String::from(
                "page size must be positive",
            )));
        }
        Ok(Self { number, size })
    }

    /// The 1-based page number.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The page size.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The zero-based row offset of the page's first row.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.size
    }
}

/// The primary key value(s) for key-based operations.
#[derive(Debug, Clone)]
pub enum KeyValue {
    /// A single key value, for single-column keys.
    Single(SqlValue),
    /// Named key values, required for composite keys. Names match key
    /// columns case-insensitively by property name.
    Composite(Vec<(String, SqlValue)>),
}

impl<T: crate::value::ToSqlValue> From<T> for KeyValue {
    fn from(value: T) -> Self {
        Self::Single(value.to_sql_value())
    }
}

/// Where a dialect places its row-count restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStrategy {
    /// `SELECT TOP n ...` prefix (SQL Server).
    TopPrefix,
    /// `... LIMIT n` suffix (PostgreSQL, SQLite).
    LimitSuffix,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn lookup_value(values: &[(String, SqlValue)], member: &str) -> Option<SqlValue> {
    values
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(member))
        .map(|(_, value)| value.clone())
}

/// Backend-specific SQL synthesis rules.
///
/// All identifier quoting, offset/fetch vs. limit/offset syntax and
/// identity-retrieval fragments are dialect hooks; the statement assembly
/// itself is shared and identical across backends.
pub trait Dialect: Send + Sync {
    /// The dialect's name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote_ident(&self, ident: &str) -> String;

    /// Where this dialect restricts row counts.
    fn limit_strategy(&self) -> LimitStrategy;

    /// The paging clause for a zero-based row offset and a fetch count.
    fn paging_clause(&self, offset: u64, fetch: u64) -> String;

    /// The fragment appended to an INSERT so the same round trip yields the
    /// new key. Includes the statement terminator where one is needed.
    fn insert_returning_suffix(&self, key: &ColumnSchema) -> String;

    /// The marker a temp-table name must start with.
    fn temp_table_prefix(&self) -> &'static str;

    /// The CREATE keyword phrase for temp tables.
    fn create_temp_table_keyword(&self) -> &'static str {
        "CREATE TABLE"
    }

    /// The column type name for a parameter kind.
    fn column_type(&self, kind: DbKind) -> Result<&'static str>;

    /// Renders the SELECT list, applying `col AS alias` wherever a column
    /// has a distinct external name.
    fn select_list(&self, schema: &TableSchema) -> String {
        schema
            .columns()
            .iter()
            .map(|c| {
                if c.is_aliased() {
                    format!(
                        "{} AS {}",
                        self.quote_ident(c.column_name()),
                        self.quote_ident(c.property_name())
                    )
                } else {
                    self.quote_ident(c.column_name())
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `SELECT COUNT(*)` with an optional verbatim conditions clause.
    fn make_count_command(
        &self,
        conditions: Option<&str>,
        params: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> SqlCommand {
        let mut text = format!("SELECT COUNT(*)\nFROM {}", self.quote_ident(schema.name()));
        if let Some(clause) = non_blank(conditions) {
            text.push('\n');
            text.push_str(clause);
        }
        SqlCommand::with_params(text, params.to_vec())
    }

    /// Selects a single row by primary key.
    fn make_find_command(&self, key: KeyValue, schema: &TableSchema) -> Result<SqlCommand> {
        let keys = schema.require_primary_key("find")?;
        let params = key_parameters(key, &keys)?;
        let text = format!(
            "SELECT {}\nFROM {}\nWHERE {}",
            self.select_list(schema),
            self.quote_ident(schema.name()),
            self.key_predicate(&keys)
        );
        Ok(SqlCommand::with_params(text, params))
    }

    /// Selects all rows matching an optional verbatim conditions clause.
    fn make_get_range_command(
        &self,
        conditions: Option<&str>,
        params: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> SqlCommand {
        let mut text = format!(
            "SELECT {}\nFROM {}",
            self.select_list(schema),
            self.quote_ident(schema.name())
        );
        if let Some(clause) = non_blank(conditions) {
            text.push('\n');
            text.push_str(clause);
        }
        SqlCommand::with_params(text, params.to_vec())
    }

    /// Selects the first `n` rows. A blank ordering expression means no
    /// ordering was requested; it is not an error.
    fn make_get_first_n_command(
        &self,
        n: u64,
        conditions: Option<&str>,
        params: &[(String, SqlValue)],
        order_by: &str,
        schema: &TableSchema,
    ) -> SqlCommand {
        let select = self.select_list(schema);
        let table = self.quote_ident(schema.name());
        let mut text = match self.limit_strategy() {
            LimitStrategy::TopPrefix => format!("SELECT TOP {n} {select}\nFROM {table}"),
            LimitStrategy::LimitSuffix => format!("SELECT {select}\nFROM {table}"),
        };
        if let Some(clause) = non_blank(conditions) {
            text.push('\n');
            text.push_str(clause);
        }
        if let Some(order) = non_blank(Some(order_by)) {
            text.push_str("\nORDER BY ");
            text.push_str(order);
        }
        if self.limit_strategy() == LimitStrategy::LimitSuffix {
            text.push_str(&format!("\nLIMIT {n}"));
        }
        SqlCommand::with_params(text, params.to_vec())
    }

    /// Selects one page of rows. Paging without an ordering expression is
    /// undefined, so a blank one is rejected.
    fn make_get_page_command(
        &self,
        page: Page,
        conditions: Option<&str>,
        params: &[(String, SqlValue)],
        order_by: &str,
        schema: &TableSchema,
    ) -> Result<SqlCommand> {
        let order = non_blank(Some(order_by)).ok_or_else(|| {
            CoreError::InvalidArgument(String::from(
                "paged queries require an ordering expression",
            ))
        })?;
        let mut text = format!(
            "SELECT {}\nFROM {}",
            self.select_list(schema),
            self.quote_ident(schema.name())
        );
        if let Some(clause) = non_blank(conditions) {
            text.push('\n');
            text.push_str(clause);
        }
        text.push_str("\nORDER BY ");
        text.push_str(order);
        text.push('\n');
        text.push_str(&self.paging_clause(page.offset(), page.size()));
        Ok(SqlCommand::with_params(text, params.to_vec()))
    }

    /// Inserts one row. The column list is the schema's insertable columns;
    /// values are taken from `entity` by property name.
    fn make_insert_command(
        &self,
        entity: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> SqlCommand {
        let (text, params) = self.insert_parts(entity, schema);
        SqlCommand::with_params(format!("{text};"), params)
    }

    /// Inserts one row and appends the dialect's identity-retrieval
    /// fragment so the same round trip yields the new key.
    fn make_insert_returning_pk_command(
        &self,
        entity: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> Result<SqlCommand> {
        let keys = schema.require_primary_key("insert returning primary key")?;
        if keys.len() > 1 {
            return Err(CoreError::InvalidArgument(format!(
                "table {} has a composite key; identity retrieval needs a single key column",
                schema.name()
            )));
        }
        let (text, params) = self.insert_parts(entity, schema);
        let suffix = self.insert_returning_suffix(keys[0]);
        Ok(SqlCommand::with_params(format!("{text}{suffix}"), params))
    }

    /// Updates one row by primary key. The SET list is the schema's
    /// updatable columns.
    fn make_update_command(
        &self,
        entity: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> Result<SqlCommand> {
        let keys = schema.require_primary_key("update")?;
        let sets = schema.updatable_columns();
        if sets.is_empty() {
            return Err(CoreError::InvalidArgument(format!(
                "table {} has no updatable columns",
                schema.name()
            )));
        }

        let set_list = sets
            .iter()
            .map(|c| format!("{} = @{}", self.quote_ident(c.column_name()), c.property_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "UPDATE {}\nSET {}\nWHERE {}",
            self.quote_ident(schema.name()),
            set_list,
            self.key_predicate(&keys)
        );

        let mut params = Vec::with_capacity(sets.len() + keys.len());
        for column in &sets {
            let value = lookup_value(entity, column.property_name()).unwrap_or(SqlValue::Null);
            params.push((String::from(column.property_name()), value));
        }
        for column in &keys {
            let value = lookup_value(entity, column.property_name()).ok_or_else(|| {
                CoreError::InvalidArgument(format!(
                    "missing value for key column {}",
                    column.property_name()
                ))
            })?;
            params.push((String::from(column.property_name()), value));
        }
        Ok(SqlCommand::with_params(text, params))
    }

    /// Deletes one row by primary key.
    fn make_delete_by_pk_command(&self, key: KeyValue, schema: &TableSchema) -> Result<SqlCommand> {
        let keys = schema.require_primary_key("delete by primary key")?;
        let params = key_parameters(key, &keys)?;
        let text = format!(
            "DELETE FROM {}\nWHERE {}",
            self.quote_ident(schema.name()),
            self.key_predicate(&keys)
        );
        Ok(SqlCommand::with_params(text, params))
    }

    /// Deletes rows matching an explicit WHERE clause. Never synthesizes an
    /// unconditional delete; use [`Dialect::make_delete_all_command`] for
    /// that.
    fn make_delete_range_command(
        &self,
        conditions: &str,
        params: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> Result<SqlCommand> {
        let clause = non_blank(Some(conditions)).ok_or_else(|| {
            CoreError::InvalidArgument(String::from(
                "delete range requires a WHERE clause; use delete all to clear a table",
            ))
        })?;
        if !clause.to_ascii_uppercase().starts_with("WHERE") {
            return Err(CoreError::InvalidArgument(String::from(
                "delete range conditions must start with WHERE",
            )));
        }
        let text = format!(
            "DELETE FROM {}\n{}",
            self.quote_ident(schema.name()),
            clause
        );
        Ok(SqlCommand::with_params(text, params.to_vec()))
    }

    /// Deletes every row. The only operation permitted to omit a WHERE
    /// clause.
    fn make_delete_all_command(&self, schema: &TableSchema) -> SqlCommand {
        SqlCommand::new(format!("DELETE FROM {}", self.quote_ident(schema.name())))
    }

    /// Creates a temp table matching the schema. The table name must carry
    /// the dialect's temp marker, validated here at synthesis time.
    fn make_create_temp_table_command(&self, schema: &TableSchema) -> Result<SqlCommand> {
        self.validate_temp_table_name(schema)?;
        if schema.columns().is_empty() {
            return Err(CoreError::InvalidArgument(format!(
                "table {} has no columns",
                schema.name()
            )));
        }
        let columns = schema
            .columns()
            .iter()
            .map(|c| {
                Ok(format!(
                    "{} {}",
                    self.quote_ident(c.column_name()),
                    self.column_type(c.kind())?
                ))
            })
            .collect::<Result<Vec<_>>>()?
            .join(",\n    ");
        let text = format!(
            "{} {}\n(\n    {}\n)",
            self.create_temp_table_keyword(),
            self.quote_ident(schema.name()),
            columns
        );
        Ok(SqlCommand::new(text))
    }

    /// Drops a temp table, validating the naming convention first.
    fn make_drop_temp_table_command(&self, schema: &TableSchema) -> Result<SqlCommand> {
        self.validate_temp_table_name(schema)?;
        Ok(SqlCommand::new(format!(
            "DROP TABLE {}",
            self.quote_ident(schema.name())
        )))
    }

    /// Renders a WHERE clause from a conditions schema, in declared-member
    /// order. Empty conditions render an empty string with no leading
    /// WHERE.
    fn make_where_clause(&self, conditions: &ConditionsSchema) -> String {
        if conditions.is_empty() {
            return String::new();
        }
        let clauses = conditions
            .entries()
            .iter()
            .map(|e| {
                let column = self.quote_ident(e.column().column_name());
                if e.is_null() {
                    format!("{column} IS NULL")
                } else {
                    format!("{column} = @{}", e.parameter_name())
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        format!("WHERE {clauses}")
    }

    /// Renders the ANDed key-equality predicate, one per key column in
    /// declared order.
    fn key_predicate(&self, keys: &[&ColumnSchema]) -> String {
        keys.iter()
            .map(|c| format!("{} = @{}", self.quote_ident(c.column_name()), c.property_name()))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// The INSERT text (without terminator) and its parameters.
    fn insert_parts(
        &self,
        entity: &[(String, SqlValue)],
        schema: &TableSchema,
    ) -> (String, Vec<(String, SqlValue)>) {
        let columns = schema.insertable_columns();
        let column_list = columns
            .iter()
            .map(|c| self.quote_ident(c.column_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholder_list = columns
            .iter()
            .map(|c| format!("@{}", c.property_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "INSERT INTO {} ({})\nVALUES ({})",
            self.quote_ident(schema.name()),
            column_list,
            placeholder_list
        );
        let params = columns
            .iter()
            .map(|c| {
                let value = lookup_value(entity, c.property_name()).unwrap_or(SqlValue::Null);
                (String::from(c.property_name()), value)
            })
            .collect();
        (text, params)
    }

    /// Validates the temp-table naming convention.
    fn validate_temp_table_name(&self, schema: &TableSchema) -> Result<()> {
        let prefix = self.temp_table_prefix();
        if !schema.name().starts_with(prefix) {
            return Err(CoreError::InvalidArgument(format!(
                "temp table names must start with {prefix:?}, got {:?}",
                schema.name()
            )));
        }
        Ok(())
    }
}

fn key_parameters(
    key: KeyValue,
    keys: &[&ColumnSchema],
) -> Result<Vec<(String, SqlValue)>> {
    match key {
        KeyValue::Single(SqlValue::Null) => Err(CoreError::InvalidArgument(String::from(
            "a primary key value is required",
        ))),
        KeyValue::Single(value) => {
            if keys.len() != 1 {
                return Err(CoreError::InvalidArgument(String::from(
                    "composite primary keys require one named value per key column",
                )));
            }
            Ok(vec![(String::from(keys[0].property_name()), value)])
        }
        KeyValue::Composite(values) => keys
            .iter()
            .map(|column| {
                match lookup_value(&values, column.property_name()) {
                    Some(SqlValue::Null) | None => Err(CoreError::InvalidArgument(format!(
                        "missing value for key column {}",
                        column.property_name()
                    ))),
                    Some(value) => Ok((String::from(column.property_name()), value)),
                }
            })
            .collect(),
    }
}
