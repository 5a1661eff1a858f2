//! Command identities, the keys of the compiled-binder cache.

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kestrel_core::ValueTag;

/// What a cache entry binds: a plain statement or a typed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityRole {
    /// A statement bound from explicit parameters.
    Statement,
    /// A statement bound from a structured template.
    Template,
}

/// Structural tag of one template member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberTag {
    /// A single value; `None` for NULL, which binds untyped.
    Scalar(Option<ValueTag>),
    /// An enumerable of scalars.
    List,
    /// A handler-owned value.
    Custom(TypeId),
}

/// Structural fingerprint of a template: its type (when known) plus a hash
/// over the ordered `(member name, member tag)` pairs.
///
/// Two templates with identical SQL but different shapes never share a
/// compiled binder; a NULL member changes the shape, because NULLs bind
/// untyped, and a list member changes it, because lists expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    type_id: Option<TypeId>,
    fingerprint: u64,
}

impl Shape {
    /// Fingerprints an ordered member list.
    pub fn of_members<'a, I>(type_id: Option<TypeId>, members: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, MemberTag)>,
    {
        let mut hasher = DefaultHasher::new();
        for (name, tag) in members {
            name.hash(&mut hasher);
            tag.hash(&mut hasher);
        }
        Self {
            type_id,
            fingerprint: hasher.finish(),
        }
    }
}

/// Key of one compiled binder: SQL text, optional template shape and role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    sql: Arc<str>,
    shape: Option<Shape>,
    role: IdentityRole,
}

impl Identity {
    /// Identity of a plain statement.
    #[must_use]
    pub fn statement(sql: &str) -> Self {
        Self {
            sql: Arc::from(sql),
            shape: None,
            role: IdentityRole::Statement,
        }
    }

    /// Identity of a template bound against a statement.
    #[must_use]
    pub fn template(sql: &str, shape: Shape) -> Self {
        Self {
            sql: Arc::from(sql),
            shape: Some(shape),
            role: IdentityRole::Template,
        }
    }

    /// The SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}
