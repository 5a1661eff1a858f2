//! # kestrel-binder
//!
//! Parameter binding for the Kestrel data-access layer: an ordered
//! parameter bag, structured templates bound through cached compiled
//! binders, IN-clause list expansion, `{=Member}` literal tokens, and
//! readback of output values.
//!
//! The binder never executes anything. It writes text and parameters into a
//! [`CommandSink`]; carrying the finished command to a driver is the
//! caller's business.
//!
//! ## Binding a command
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kestrel_binder::{CommandSink, MemoryCommand, ParamBag, SqlContext};
//! use kestrel_core::dialect::MsSql2012Dialect;
//!
//! let context = SqlContext::new(Arc::new(MsSql2012Dialect::new()));
//!
//! let mut command = MemoryCommand::new(
//!     "SELECT * FROM Dogs WHERE Name = @Name AND Age IN @Ages",
//! );
//! let mut bag = ParamBag::new();
//! bag.add("Name", "Rex");
//! bag.add("Ages", kestrel_binder::ParamValue::list([8, 9]));
//! bag.apply(&mut command, &context.bind_context()).unwrap();
//!
//! assert_eq!(
//!     command.text(),
//!     "SELECT * FROM Dogs WHERE Name = @Name AND Age IN (@Ages1, @Ages2)"
//! );
//! ```

pub mod bag;
pub mod binder;
pub mod context;
pub mod error;
pub mod identity;
pub mod literal;
pub mod sink;
pub mod types;

pub use bag::{FromSqlValue, ParamBag, ParamDecl};
pub use binder::BinderCache;
pub use context::{BindContext, SqlContext};
pub use error::{BindError, Result};
pub use identity::{Identity, IdentityRole, MemberTag, Shape};
pub use literal::{LiteralCache, LiteralToken};
pub use sink::{lock_param, CommandSink, MemoryCommand, ParamDirection, ParamHandle, ProviderParam};
pub use types::{ParamValue, TypeHandler, TypeResolver};
