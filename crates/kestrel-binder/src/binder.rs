//! Compiled binders: per-identity binding plans and their cache.
//!
//! The first time a statement/shape pair is bound, the member list is
//! compiled into a step plan; every later bind of the same identity replays
//! the plan without re-inspecting the members.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use kestrel_core::{CoreError, DbKind, SqlValue};
use regex::Regex;
use tracing::debug;

use crate::error::{BindError, Result};
use crate::identity::Identity;
use crate::sink::{lock_param, CommandSink, ParamDirection, ParamHandle, ProviderParam};
use crate::types::{ParamValue, TypeResolver};

/// Default size bucket for text parameters. Keeping short strings on one
/// declared size lets the server reuse one query plan across lengths.
pub(crate) const DEFAULT_TEXT_SIZE: i32 = 4000;

const EMPTY_LIST_CLAUSE: &str = "(SELECT NULL WHERE 1 = 0)";

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Bind the member as a single parameter.
    Bind(usize),
    /// Expand the member into an IN-clause parameter list.
    ExpandList(usize),
    /// Record the member's value for literal substitution; never bind it.
    Literal(usize),
}

/// A compiled binding plan for one identity.
///
/// Indices into the member list are stable because the member names, order
/// and tags are all part of the identity's shape.
#[derive(Debug)]
pub struct CompiledBinder {
    steps: Vec<Step>,
}

impl CompiledBinder {
    pub(crate) fn build(
        sql: &str,
        members: &[(String, ParamValue)],
        literal_members: &[String],
        remove_unused: bool,
    ) -> Result<Self> {
        let mut steps = Vec::with_capacity(members.len());
        for (index, (name, value)) in members.iter().enumerate() {
            if literal_members.iter().any(|m| m.eq_ignore_ascii_case(name)) {
                steps.push(Step::Literal(index));
                continue;
            }
            if remove_unused && !placeholder_pattern(name)?.is_match(sql) {
                continue;
            }
            match value {
                ParamValue::List(_) => steps.push(Step::ExpandList(index)),
                ParamValue::Scalar(_) | ParamValue::Custom { .. } => steps.push(Step::Bind(index)),
            }
        }
        debug!(members = members.len(), steps = steps.len(), "compiled binding plan");
        Ok(Self { steps })
    }

    /// Replays the plan against a sink. Returns the values recorded for
    /// literal substitution.
    pub(crate) fn apply(
        &self,
        sink: &mut dyn CommandSink,
        members: &[(String, ParamValue)],
        resolver: &TypeResolver,
    ) -> Result<Vec<(String, SqlValue)>> {
        let mut literal_values = Vec::new();
        for step in &self.steps {
            match *step {
                Step::Literal(index) => {
                    let (name, value) = &members[index];
                    match value {
                        ParamValue::Scalar(v) => literal_values.push((name.clone(), v.clone())),
                        ParamValue::List(_) | ParamValue::Custom { .. } => {
                            return Err(BindError::UnsafeLiteral {
                                member: name.clone(),
                                kind: "non-scalar",
                            })
                        }
                    }
                }
                Step::ExpandList(index) => {
                    let (name, value) = &members[index];
                    if let ParamValue::List(values) = value {
                        expand_list(sink, name, values, resolver)?;
                    }
                }
                Step::Bind(index) => {
                    let (name, value) = &members[index];
                    attach_param(
                        sink,
                        name,
                        value,
                        BindOverrides::default(),
                        ParamDirection::Input,
                        resolver,
                    )?;
                }
            }
        }
        Ok(literal_values)
    }
}

/// Cache of compiled binders, keyed by [`Identity`].
///
/// Many-readers/one-builder: a miss re-checks under the write lock so each
/// identity is compiled at most once, and entries are never invalidated.
#[derive(Debug, Default)]
pub struct BinderCache {
    cache: RwLock<HashMap<Identity, Arc<CompiledBinder>>>,
}

impl BinderCache {
    pub(crate) fn get_or_build(
        &self,
        identity: &Identity,
        build: impl FnOnce() -> Result<CompiledBinder>,
    ) -> Result<Arc<CompiledBinder>> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(binder) = cache.get(identity) {
                return Ok(Arc::clone(binder));
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(binder) = cache.get(identity) {
            return Ok(Arc::clone(binder));
        }

        let binder = Arc::new(build()?);
        cache.insert(identity.clone(), Arc::clone(&binder));
        Ok(binder)
    }

    /// Number of compiled binders currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn placeholder_pattern(name: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)([@:?]){}\b", regex::escape(name))).map_err(|e| {
        BindError::from(CoreError::InvalidArgument(format!(
            "parameter name {name} is not usable in SQL: {e}"
        )))
    })
}

/// Explicit per-declaration settings that beat inference.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BindOverrides {
    pub(crate) kind: Option<DbKind>,
    pub(crate) size: Option<i32>,
    pub(crate) precision: Option<u8>,
    pub(crate) scale: Option<u8>,
}

/// Attaches (or re-targets) one non-list parameter on the sink.
pub(crate) fn attach_param(
    sink: &mut dyn CommandSink,
    name: &str,
    value: &ParamValue,
    overrides: BindOverrides,
    direction: ParamDirection,
    resolver: &TypeResolver,
) -> Result<ParamHandle> {
    let handle = match sink.get(name) {
        Some(handle) => handle,
        None => sink.add(ProviderParam::new(name)),
    };

    match value {
        ParamValue::Custom {
            type_id,
            type_name,
            value,
        } => {
            let handler = resolver
                .handler_for(*type_id)
                .ok_or_else(|| BindError::UnmappableType(String::from(*type_name)))?;
            let mut param = lock_param(&handle);
            param.direction = direction;
            param.kind = overrides.kind;
            param.size = overrides.size;
            param.precision = overrides.precision;
            param.scale = overrides.scale;
            handler.set_value(&mut param, value.as_ref())?;
        }
        ParamValue::Scalar(v) => {
            let kind = match overrides.kind {
                Some(kind) => Some(kind),
                None => resolver.resolve_scalar(v)?,
            };
            let size = overrides.size.or_else(|| text_size(v));
            let mut param = lock_param(&handle);
            param.value = v.clone();
            param.kind = kind;
            param.direction = direction;
            param.size = size;
            param.precision = overrides.precision;
            param.scale = overrides.scale;
        }
        ParamValue::List(_) => {
            return Err(BindError::from(CoreError::InvalidArgument(format!(
                "parameter {name} is a list; lists expand instead of binding directly"
            ))))
        }
    }
    Ok(handle)
}

// Sizes are in characters, not bytes, matching how providers declare
// variable-length text columns.
fn text_size(value: &SqlValue) -> Option<i32> {
    let SqlValue::Text(s) = value else {
        return None;
    };
    let chars = s.chars().count();
    if chars <= DEFAULT_TEXT_SIZE as usize {
        Some(DEFAULT_TEXT_SIZE)
    } else {
        i32::try_from(chars).ok()
    }
}

/// Expands a list member: rewrites the `@Name` placeholder to
/// `(@Name1, ..., @NameN)` and attaches one parameter per element. An empty
/// list rewrites to a clause that matches no rows.
pub(crate) fn expand_list(
    sink: &mut dyn CommandSink,
    name: &str,
    values: &[SqlValue],
    resolver: &TypeResolver,
) -> Result<()> {
    let pattern = placeholder_pattern(name)?;
    let rewritten = pattern
        .replace_all(sink.text(), |captures: &regex::Captures<'_>| {
            let prefix = &captures[1];
            if values.is_empty() {
                String::from(EMPTY_LIST_CLAUSE)
            } else {
                let names: Vec<String> = (1..=values.len())
                    .map(|i| format!("{prefix}{name}{i}"))
                    .collect();
                format!("({})", names.join(", "))
            }
        })
        .into_owned();
    sink.set_text(rewritten);

    for (i, value) in values.iter().enumerate() {
        let kind = resolver.resolve_scalar(value)?;
        let element_name = format!("{name}{}", i + 1);
        let handle = match sink.get(&element_name) {
            Some(handle) => handle,
            None => sink.add(ProviderParam::new(element_name)),
        };
        let mut param = lock_param(&handle);
        param.value = value.clone();
        param.kind = kind;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryCommand;

    #[test]
    fn expands_three_element_list() {
        let mut command = MemoryCommand::new("SELECT * FROM Dogs WHERE Age IN @Ages");
        let resolver = TypeResolver::default();

        expand_list(
            &mut command,
            "Ages",
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)],
            &resolver,
        )
        .unwrap();

        assert_eq!(
            command.text(),
            "SELECT * FROM Dogs WHERE Age IN (@Ages1, @Ages2, @Ages3)"
        );
        let names: Vec<String> = command
            .handles()
            .iter()
            .map(|h| lock_param(h).name.clone())
            .collect();
        assert_eq!(names, ["Ages1", "Ages2", "Ages3"]);
    }

    #[test]
    fn empty_list_matches_no_rows() {
        let mut command = MemoryCommand::new("SELECT * FROM Dogs WHERE Age IN @Ages");
        let resolver = TypeResolver::default();

        expand_list(&mut command, "Ages", &[], &resolver).unwrap();

        assert_eq!(
            command.text(),
            "SELECT * FROM Dogs WHERE Age IN (SELECT NULL WHERE 1 = 0)"
        );
        assert!(command.handles().is_empty());
    }

    #[test]
    fn expansion_does_not_touch_prefixed_names() {
        let mut command = MemoryCommand::new("SELECT @Ages2 WHERE Age IN @Ages");
        let resolver = TypeResolver::default();

        expand_list(&mut command, "Ages", &[SqlValue::Int(1)], &resolver).unwrap();

        assert_eq!(command.text(), "SELECT @Ages2 WHERE Age IN (@Ages1)");
    }

    #[test]
    fn remove_unused_drops_members_without_placeholders() {
        let members = vec![
            (String::from("Name"), ParamValue::from("Rex")),
            (String::from("Age"), ParamValue::from(9)),
        ];
        let binder =
            CompiledBinder::build("SELECT * FROM Dogs WHERE Name = @Name", &members, &[], true)
                .unwrap();

        let mut command = MemoryCommand::new("SELECT * FROM Dogs WHERE Name = @Name");
        let resolver = TypeResolver::default();
        binder.apply(&mut command, &members, &resolver).unwrap();

        assert_eq!(command.handles().len(), 1);
        assert_eq!(lock_param(&command.handles()[0]).name, "Name");
    }

    #[test]
    fn text_size_buckets_by_character_count() {
        // 3 bytes per char in UTF-8; 2000 chars stays inside the bucket
        // even though the byte length is 6000.
        let short = SqlValue::Text("\u{3042}".repeat(2000));
        assert_eq!(text_size(&short), Some(DEFAULT_TEXT_SIZE));

        let long = SqlValue::Text("\u{3042}".repeat(4001));
        assert_eq!(text_size(&long), Some(4001));

        assert_eq!(text_size(&SqlValue::Int(1)), None);
    }

    #[test]
    fn cache_builds_once_per_identity() {
        let cache = BinderCache::default();
        let identity = Identity::statement("SELECT 1");
        let mut builds = 0;

        for _ in 0..3 {
            cache
                .get_or_build(&identity, || {
                    builds += 1;
                    CompiledBinder::build("SELECT 1", &[], &[], false)
                })
                .unwrap();
        }

        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }
}
