//! The long-lived context owning the binder's shared state.

use std::sync::Arc;

use kestrel_core::dialect::Dialect;
use kestrel_core::schema::SchemaFactory;

use crate::binder::BinderCache;
use crate::literal::LiteralCache;
use crate::types::TypeResolver;

/// Owner of everything a process shares across operations: the dialect, the
/// schema cache, the type mappings and the two binder-side caches.
///
/// There are no global statics; create one context per database (or per
/// test) and hand out references.
pub struct SqlContext {
    dialect: Arc<dyn Dialect>,
    schemas: SchemaFactory,
    resolver: TypeResolver,
    binders: BinderCache,
    literals: LiteralCache,
    remove_unused: bool,
}

impl SqlContext {
    /// Creates a context for the given dialect, with default naming,
    /// default type mappings and empty caches.
    #[must_use]
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            schemas: SchemaFactory::default(),
            resolver: TypeResolver::default(),
            binders: BinderCache::default(),
            literals: LiteralCache::default(),
            remove_unused: false,
        }
    }

    /// Replaces the schema factory, e.g. to change the naming convention.
    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaFactory) -> Self {
        self.schemas = schemas;
        self
    }

    /// When set, template members whose placeholder does not occur in the
    /// SQL text are dropped instead of bound.
    pub fn set_remove_unused(&mut self, remove_unused: bool) {
        self.remove_unused = remove_unused;
    }

    /// The configured dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// The schema factory and its cache.
    #[must_use]
    pub fn schemas(&self) -> &SchemaFactory {
        &self.schemas
    }

    /// The type resolver, mutable for mapping overrides and handler
    /// registration. Configure before sharing the context.
    pub fn resolver_mut(&mut self) -> &mut TypeResolver {
        &mut self.resolver
    }

    /// The compiled-binder cache.
    #[must_use]
    pub fn binders(&self) -> &BinderCache {
        &self.binders
    }

    /// The borrowed view a bag binds against.
    #[must_use]
    pub fn bind_context(&self) -> BindContext<'_> {
        BindContext {
            resolver: &self.resolver,
            binders: &self.binders,
            literals: &self.literals,
            remove_unused: self.remove_unused,
        }
    }
}

/// Borrowed view of a [`SqlContext`] for one bind pass.
pub struct BindContext<'a> {
    pub(crate) resolver: &'a TypeResolver,
    pub(crate) binders: &'a BinderCache,
    pub(crate) literals: &'a LiteralCache,
    pub(crate) remove_unused: bool,
}
