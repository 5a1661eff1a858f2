//! Command sink abstraction.
//!
//! Executing a command belongs to an external driver; the binder only needs
//! a mutable view of the command's text and parameter collection. That view
//! is [`CommandSink`]. [`MemoryCommand`] is the in-crate implementation used
//! by tests and demos.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kestrel_core::{DbKind, SqlValue};

/// Which way a parameter's value flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    /// Value supplied by the caller.
    Input,
    /// Value produced by the statement.
    Output,
    /// Both supplied and produced.
    InputOutput,
    /// A procedure's return value.
    ReturnValue,
}

/// A parameter as the external driver will see it.
#[derive(Debug, Clone)]
pub struct ProviderParam {
    /// The parameter name, without any prefix marker.
    pub name: String,
    /// The current value. Output parameters start at NULL and are filled in
    /// by the executor.
    pub value: SqlValue,
    /// The provider-neutral kind, if one was resolved. NULL values bind
    /// untyped.
    pub kind: Option<DbKind>,
    /// The value flow direction.
    pub direction: ParamDirection,
    /// Declared size, for text values.
    pub size: Option<i32>,
    /// Declared precision, for decimal values.
    pub precision: Option<u8>,
    /// Declared scale, for decimal values.
    pub scale: Option<u8>,
}

impl ProviderParam {
    /// Creates an untyped NULL input parameter with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SqlValue::Null,
            kind: None,
            direction: ParamDirection::Input,
            size: None,
            precision: None,
            scale: None,
        }
    }
}

/// Shared handle to a parameter on a sink.
///
/// The bag keeps one per parameter it attached, so values written by the
/// executor (output parameters, in/out round trips) stay visible to
/// [`ParamBag::get`](crate::ParamBag::get) afterwards.
pub type ParamHandle = Arc<Mutex<ProviderParam>>;

/// Locks a handle, recovering from poisoning. Parameters hold plain data,
/// so a panicked writer cannot leave them in a broken state.
pub fn lock_param(handle: &ParamHandle) -> MutexGuard<'_, ProviderParam> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mutable view of a command under construction: its SQL text and its
/// parameter collection. Implemented by whatever carries commands to the
/// executing driver.
pub trait CommandSink {
    /// The current SQL text.
    fn text(&self) -> &str;

    /// Replaces the SQL text (list expansion, literal substitution).
    fn set_text(&mut self, text: String);

    /// Whether a parameter with this name is already attached.
    /// Names compare case-insensitively.
    fn contains(&self, name: &str) -> bool;

    /// Attaches a parameter and returns its handle.
    fn add(&mut self, param: ProviderParam) -> ParamHandle;

    /// The handle for an attached parameter, if any.
    fn get(&self, name: &str) -> Option<ParamHandle>;

    /// All attached handles, in attachment order.
    fn handles(&self) -> Vec<ParamHandle>;
}

/// An in-memory command: SQL text plus attached parameters.
#[derive(Debug, Default)]
pub struct MemoryCommand {
    text: String,
    params: Vec<ParamHandle>,
}

impl MemoryCommand {
    /// Creates a command with the given SQL text and no parameters.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }
}

impl CommandSink for MemoryCommand {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn contains(&self, name: &str) -> bool {
        self.params
            .iter()
            .any(|p| lock_param(p).name.eq_ignore_ascii_case(name))
    }

    fn add(&mut self, param: ProviderParam) -> ParamHandle {
        let handle = Arc::new(Mutex::new(param));
        self.params.push(Arc::clone(&handle));
        handle
    }

    fn get(&self, name: &str) -> Option<ParamHandle> {
        self.params
            .iter()
            .find(|p| lock_param(p).name.eq_ignore_ascii_case(name))
            .map(Arc::clone)
    }

    fn handles(&self) -> Vec<ParamHandle> {
        self.params.clone()
    }
}
