//! The parameter bag: declared parameters, templates and readback.

use std::any::TypeId;

use kestrel_core::{DbKind, SqlValue};
use serde::Serialize;

use crate::binder::{attach_param, expand_list, BindOverrides, CompiledBinder};
use crate::context::BindContext;
use crate::error::{BindError, Result};
use crate::identity::{Identity, MemberTag, Shape};
use crate::literal::replace_literals;
use crate::sink::{lock_param, CommandSink, ParamDirection, ParamHandle};
use crate::types::ParamValue;

fn clean_name(name: &str) -> &str {
    match name.chars().next() {
        Some('@' | ':' | '?') => &name[1..],
        _ => name,
    }
}

/// A declared parameter: name, value and optional binding overrides.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub(crate) name: String,
    pub(crate) value: ParamValue,
    pub(crate) kind: Option<DbKind>,
    pub(crate) direction: ParamDirection,
    pub(crate) size: Option<i32>,
    pub(crate) precision: Option<u8>,
    pub(crate) scale: Option<u8>,
}

impl ParamDecl {
    /// Declares an input parameter. A leading `@`, `:` or `?` on the name
    /// is stripped.
    pub fn new(name: &str, value: impl Into<ParamValue>) -> Self {
        Self {
            name: String::from(clean_name(name)),
            value: value.into(),
            kind: None,
            direction: ParamDirection::Input,
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// Overrides the resolved parameter kind.
    #[must_use]
    pub fn kind(mut self, kind: DbKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the value flow direction.
    #[must_use]
    pub fn direction(mut self, direction: ParamDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets an explicit size, bypassing the default text size bucket.
    #[must_use]
    pub fn size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets an explicit precision, for decimal values.
    #[must_use]
    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets an explicit scale, for decimal values.
    #[must_use]
    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }
}

#[derive(Debug)]
struct ParamInfo {
    decl: ParamDecl,
    attached: Option<ParamHandle>,
    came_from_template: bool,
}

#[derive(Debug)]
struct Template {
    type_id: TypeId,
    members: Vec<(String, ParamValue)>,
}

fn member_tag(value: &ParamValue) -> MemberTag {
    match value {
        ParamValue::Scalar(v) => MemberTag::Scalar(v.tag()),
        ParamValue::List(_) => MemberTag::List,
        ParamValue::Custom { type_id, .. } => MemberTag::Custom(*type_id),
    }
}

fn json_scalar(name: &str, value: serde_json::Value) -> Result<SqlValue> {
    match value {
        serde_json::Value::Null => Ok(SqlValue::Null),
        serde_json::Value::Bool(b) => Ok(SqlValue::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Float(f))
            } else {
                Err(BindError::Template(format!(
                    "member {name} holds an unrepresentable number"
                )))
            }
        }
        serde_json::Value::String(s) => Ok(SqlValue::Text(s)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(BindError::Template(
            format!("member {name} nests a structure inside a list"),
        )),
    }
}

fn json_member(name: &str, value: serde_json::Value) -> Result<ParamValue> {
    match value {
        serde_json::Value::Array(items) => {
            let values = items
                .into_iter()
                .map(|item| json_scalar(name, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(ParamValue::List(values))
        }
        serde_json::Value::Object(_) => Err(BindError::Template(format!(
            "member {name} is a nested object"
        ))),
        scalar => Ok(ParamValue::Scalar(json_scalar(name, scalar)?)),
    }
}

/// An ordered bag of parameters bound onto a command sink in one pass.
///
/// A bag collects explicit name/value declarations, structured templates
/// and nested bags, then [`apply`](Self::apply)s them all against a sink.
/// After the external executor runs the command, output values are read
/// back with [`get`](Self::get).
///
/// A bag belongs to one logical operation at a time; `apply` takes `&mut
/// self` so the attached handles stay private to that operation.
#[derive(Debug, Default)]
pub struct ParamBag {
    params: Vec<ParamInfo>,
    templates: Vec<Template>,
    // Members already spliced into the text as literals. A later apply
    // sees the substituted text, so the tokens alone no longer identify
    // them.
    literal_members: Vec<String>,
}

impl ParamBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an input parameter. Re-adding a name replaces the earlier
    /// declaration.
    pub fn add(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.add_param(ParamDecl::new(name, value));
    }

    /// Declares a batch of name/value pairs, each as an explicit parameter.
    pub fn add_pairs<I, N, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<ParamValue>,
    {
        for (name, value) in pairs {
            self.add(name.as_ref(), value);
        }
    }

    /// Declares a parameter with explicit overrides. Re-adding a name
    /// replaces the earlier declaration.
    pub fn add_param(&mut self, decl: ParamDecl) {
        let info = ParamInfo {
            decl,
            attached: None,
            came_from_template: false,
        };
        match self.find_index(&info.decl.name) {
            Some(index) => self.params[index] = info,
            None => self.params.push(info),
        }
    }

    /// Ingests a structured template. Each serialized member becomes a
    /// parameter at bind time, through a compiled binder cached per
    /// (SQL text, template shape).
    pub fn add_template<T: Serialize + 'static>(&mut self, template: &T) -> Result<()> {
        let value = serde_json::to_value(template)
            .map_err(|e| BindError::Template(e.to_string()))?;
        let serde_json::Value::Object(map) = value else {
            return Err(BindError::Template(format!(
                "{} does not serialize to an object",
                std::any::type_name::<T>()
            )));
        };
        let mut members = Vec::with_capacity(map.len());
        for (name, member) in map {
            let value = json_member(&name, member)?;
            members.push((name, value));
        }
        self.templates.push(Template {
            type_id: TypeId::of::<T>(),
            members,
        });
        Ok(())
    }

    /// Merges another bag into this one. Templates concatenate; a
    /// parameter name declared on both sides is an error.
    pub fn append_bag(&mut self, other: ParamBag) -> Result<()> {
        for info in other.params {
            if self.find_index(&info.decl.name).is_some() {
                return Err(BindError::DuplicateParameter(info.decl.name));
            }
            self.params.push(info);
        }
        self.templates.extend(other.templates);
        Ok(())
    }

    /// The declared and template-discovered parameter names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|info| info.decl.name.as_str()).collect()
    }

    /// Binds everything onto the sink.
    ///
    /// Templates bind first through their cached compiled binders, then
    /// parameters already on the sink are adopted for readback, then the
    /// explicit declarations apply in insertion order, reusing a same-named
    /// sink parameter and overwriting its value. A declaration that was
    /// already attached by an earlier apply is skipped entirely. Literal
    /// tokens are spliced once, at the end, over the final text.
    pub fn apply(&mut self, sink: &mut dyn CommandSink, ctx: &BindContext<'_>) -> Result<()> {
        let original_text = String::from(sink.text());
        let tokens = ctx.literals.tokens(&original_text);
        let mut literal_members = self.literal_members.clone();
        for token in tokens.iter() {
            if !literal_members
                .iter()
                .any(|m| m.eq_ignore_ascii_case(token.member()))
            {
                literal_members.push(String::from(token.member()));
            }
        }
        let mut literal_values: Vec<(String, SqlValue)> = Vec::new();

        for template in &self.templates {
            let shape = Shape::of_members(
                Some(template.type_id),
                template
                    .members
                    .iter()
                    .map(|(name, value)| (name.as_str(), member_tag(value))),
            );
            let identity = Identity::template(&original_text, shape);
            let binder = ctx.binders.get_or_build(&identity, || {
                CompiledBinder::build(
                    &original_text,
                    &template.members,
                    &literal_members,
                    ctx.remove_unused,
                )
            })?;
            literal_values.extend(binder.apply(sink, &template.members, ctx.resolver)?);
        }

        // Adopt the parameters the templates put on the sink, so their
        // values stay readable after execution. Only unknown names become
        // template-owned entries; a name the bag already declares keeps its
        // explicit entry and is re-bound below, overwriting the template's
        // value.
        if !self.templates.is_empty() {
            for handle in sink.handles() {
                let name = lock_param(&handle).name.clone();
                if self.find_index(&name).is_none() {
                    self.params.push(ParamInfo {
                        decl: ParamDecl::new(&name, SqlValue::Null),
                        attached: Some(handle),
                        came_from_template: true,
                    });
                }
            }
        }

        for index in 0..self.params.len() {
            if self.params[index].came_from_template || self.params[index].attached.is_some() {
                continue;
            }
            let decl = self.params[index].decl.clone();

            if literal_members.iter().any(|m| m.eq_ignore_ascii_case(&decl.name)) {
                match &decl.value {
                    ParamValue::Scalar(v) => {
                        literal_values.push((decl.name.clone(), v.clone()));
                    }
                    ParamValue::List(_) | ParamValue::Custom { .. } => {
                        return Err(BindError::UnsafeLiteral {
                            member: decl.name.clone(),
                            kind: "non-scalar",
                        })
                    }
                }
                continue;
            }

            match &decl.value {
                ParamValue::List(values) => {
                    expand_list(sink, &decl.name, values, ctx.resolver)?;
                }
                ParamValue::Scalar(_) | ParamValue::Custom { .. } => {
                    let handle = attach_param(
                        sink,
                        &decl.name,
                        &decl.value,
                        BindOverrides {
                            kind: decl.kind,
                            size: decl.size,
                            precision: decl.precision,
                            scale: decl.scale,
                        },
                        decl.direction,
                        ctx.resolver,
                    )?;
                    self.params[index].attached = Some(handle);
                }
            }
        }

        if !tokens.is_empty() {
            let text = replace_literals(sink.text(), &tokens, |member| {
                literal_values
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(member))
                    .map(|(_, value)| value.clone())
            })?;
            sink.set_text(text);
        }
        self.literal_members = literal_members;
        Ok(())
    }

    /// Reads a parameter's current value back out of the bag.
    ///
    /// Attached parameters reflect whatever the executor last wrote (output
    /// and in/out values included); unattached ones fall back to the
    /// declared value. Meaningful only after the command has executed.
    pub fn get<T: FromSqlValue>(&self, name: &str) -> Result<T> {
        let cleaned = clean_name(name);
        let info = self
            .find(cleaned)
            .ok_or_else(|| BindError::MissingParameter(String::from(cleaned)))?;
        let value = match &info.attached {
            Some(handle) => lock_param(handle).value.clone(),
            None => match &info.decl.value {
                ParamValue::Scalar(v) => v.clone(),
                ParamValue::List(_) | ParamValue::Custom { .. } => SqlValue::Null,
            },
        };
        T::from_sql_value(cleaned, &value)
    }

    fn find(&self, name: &str) -> Option<&ParamInfo> {
        self.params
            .iter()
            .find(|info| info.decl.name.eq_ignore_ascii_case(name))
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|info| info.decl.name.eq_ignore_ascii_case(name))
    }
}

/// Conversion from a read-back [`SqlValue`].
///
/// `Option<T>` turns NULL into `None`; every non-optional implementation
/// treats NULL as a [`BindError::NullCoercion`].
pub trait FromSqlValue: Sized {
    /// Converts the value, using `name` in error messages.
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self>;
}

fn mismatch(name: &str, expected: &'static str, value: &SqlValue) -> BindError {
    BindError::TypeMismatch {
        name: String::from(name),
        expected,
        actual: value.kind_name(),
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int(n) => Ok(*n),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "int", other)),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int(n) => {
                i32::try_from(*n).map_err(|_| mismatch(name, "32-bit int", value))
            }
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "int", other)),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "float", other)),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "bool", other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "text", other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(b) => Ok(b.clone()),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "blob", other)),
        }
    }
}

impl FromSqlValue for chrono::NaiveDate {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Date(d) => Ok(*d),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "date", other)),
        }
    }
}

impl FromSqlValue for chrono::NaiveDateTime {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(t) => Ok(*t),
            SqlValue::Null => Err(BindError::NullCoercion(String::from(name))),
            other => Err(mismatch(name, "timestamp", other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(name: &str, value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(name, other).map(Some),
        }
    }
}
