//! SQLite dialect.

use super::{Dialect, LimitStrategy};
use crate::error::{CoreError, Result};
use crate::schema::ColumnSchema;
use crate::types::DbKind;

/// Dialect for SQLite: double-quote quoting, `LIMIT`/`OFFSET`,
/// `last_insert_rowid()` retrieval and `temp_`-prefixed temp tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
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

    fn insert_returning_suffix(&self, _key: &ColumnSchema) -> String {
        String::from(";\nSELECT last_insert_rowid() AS id")
    }

    fn temp_table_prefix(&self) -> &'static str {
        "temp_"
    }

    fn create_temp_table_keyword(&self) -> &'static str {
        "CREATE TEMP TABLE"
    }

    fn column_type(&self, kind: DbKind) -> Result<&'static str> {
        match kind {
            DbKind::Boolean | DbKind::Int16 | DbKind::Int32 | DbKind::Int64 => Ok("INTEGER"),
            DbKind::Float32 | DbKind::Float64 => Ok("REAL"),
            DbKind::Decimal => Ok("NUMERIC"),
            DbKind::Text => Ok("TEXT"),
            DbKind::Binary => Ok("BLOB"),
            DbKind::Date | DbKind::Timestamp => Ok("TEXT"),
            DbKind::Multi => Err(CoreError::UnmappableType(String::from(
                "multi-value parameter kind has no column type",
            ))),
        }
    }
}
