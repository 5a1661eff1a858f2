//! # kestrel-core
//!
//! Schema model, dialects and SQL synthesis for the Kestrel data-access
//! layer.
//!
//! This crate provides:
//! - An explicit, cached table-schema model built from entity descriptions
//! - Pure, dialect-aware synthesis of parameterized CRUD, paging and
//!   temp-table statements
//! - Provider-neutral parameter kinds shared with the binder layer
//!
//! It never performs I/O; executing the synthesized commands belongs to an
//! external executor.
//!
//! ## Synthesizing a statement
//!
//! ```rust
//! use kestrel_core::dialect::{Dialect, MsSql2012Dialect};
//! use kestrel_core::schema::{ColumnDef, Entity, EntityDef, SchemaFactory};
//! use kestrel_core::DbKind;
//!
//! struct Dog;
//!
//! impl Entity for Dog {
//!     fn describe() -> EntityDef {
//!         EntityDef::new("Dog")
//!             .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
//!             .column(ColumnDef::new("Name", DbKind::Text))
//!             .column(ColumnDef::new("Age", DbKind::Int32))
//!     }
//! }
//!
//! let factory = SchemaFactory::default();
//! let schema = factory.get_table_schema::<Dog>();
//!
//! let command = MsSql2012Dialect::new().make_find_command(5.into(), &schema).unwrap();
//! assert_eq!(
//!     command.text(),
//!     "SELECT [Id], [Name], [Age]\nFROM [Dogs]\nWHERE [Id] = @Id"
//! );
//! ```

pub mod command;
pub mod dialect;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use command::SqlCommand;
pub use dialect::{Dialect, KeyValue, Page};
pub use error::{CoreError, Result};
pub use schema::{Entity, SchemaFactory, TableSchema};
pub use types::{DbKind, ValueTag};
pub use value::{SqlValue, ToSqlValue};
