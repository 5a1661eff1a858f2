//! PostgreSQL dialect.

use super::{Dialect, LimitStrategy};
use crate::error::{CoreError, Result};
use crate::schema::ColumnSchema;
use crate::types::DbKind;

/// Dialect for PostgreSQL: double-quote quoting, `LIMIT`/`OFFSET`,
/// `RETURNING` for identity retrieval and `temp_`-prefixed temp tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    fn limit_strategy(&self) -> LimitStrategy {
        LimitStrategy::LimitSuffix
    }

    fn paging_clause(&self, offset: u64, fetch: u64) -> String {
        format!("LIMIT {fetch} OFFSET {offset}")
    }

    fn insert_returning_suffix(&self, key: &ColumnSchema) -> String {
        format!("\nRETURNING {}", self.quote_ident(key.column_name()))
    }

    fn temp_table_prefix(&self) -> &'static str {
        "temp_"
    }

    fn create_temp_table_keyword(&self) -> &'static str {
        "CREATE TEMP TABLE"
    }

    fn column_type(&self, kind: DbKind) -> Result<&'static str> {
        match kind {
            DbKind::Boolean => Ok("BOOLEAN"),
            DbKind::Int16 => Ok("SMALLINT"),
            DbKind::Int32 => Ok("INT"),
            DbKind::Int64 => Ok("BIGINT"),
            DbKind::Float32 => Ok("REAL"),
            DbKind::Float64 => Ok("DOUBLE PRECISION"),
            DbKind::Decimal => Ok("NUMERIC"),
            DbKind::Text => Ok("TEXT"),
            DbKind::Binary => Ok("BYTEA"),
            DbKind::Date => Ok("DATE"),
            DbKind::Timestamp => Ok("TIMESTAMP"),
            DbKind::Multi => Err(CoreError::UnmappableType(String::from(
                "multi-value parameter kind has no column type",
            ))),
        }
    }
}
