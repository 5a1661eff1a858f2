//! SQL Server 2012+ dialect.

use super::{Dialect, LimitStrategy};
use crate::error::{CoreError, Result};
use crate::schema::ColumnSchema;
use crate::types::DbKind;

/// Dialect for SQL Server 2012 and later: bracket quoting, `TOP n`,
/// `OFFSET ... FETCH NEXT`, `SCOPE_IDENTITY()` retrieval and `#`-prefixed
/// temp tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsSql2012Dialect;

impl MsSql2012Dialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MsSql2012Dialect {
    fn name(&self) -> &'static str {
        "mssql2012"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("[{ident}]")
    }

    fn limit_strategy(&self) -> LimitStrategy {
        LimitStrategy::TopPrefix
    }

    fn paging_clause(&self, offset: u64, fetch: u64) -> String {
        format!("OFFSET {offset} ROWS FETCH NEXT {fetch} ROWS ONLY")
    }

    fn insert_returning_suffix(&self, _key: &ColumnSchema) -> String {
        String::from(";\nSELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]")
    }

    fn temp_table_prefix(&self) -> &'static str {
        "#"
    }

    fn column_type(&self, kind: DbKind) -> Result<&'static str> {
        match kind {
            DbKind::Boolean => Ok("BIT"),
            DbKind::Int16 => Ok("SMALLINT"),
            DbKind::Int32 => Ok("INT"),
            DbKind::Int64 => Ok("BIGINT"),
            DbKind::Float32 => Ok("REAL"),
            DbKind::Float64 => Ok("FLOAT"),
            DbKind::Decimal => Ok("NUMERIC(18, 2)"),
            DbKind::Text => Ok("NVARCHAR(MAX)"),
            DbKind::Binary => Ok("VARBINARY(MAX)"),
            DbKind::Date => Ok("DATE"),
            DbKind::Timestamp => Ok("DATETIME2(7)"),
            DbKind::Multi => Err(CoreError::UnmappableType(String::from(
                "multi-value parameter kind has no column type",
            ))),
        }
    }
}
