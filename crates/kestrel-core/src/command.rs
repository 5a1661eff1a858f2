//! Synthesized SQL commands.

use crate::value::SqlValue;

/// SQL text plus its ordered, named parameter set.
///
/// Two commands are equal when their whitespace-normalized text and their
/// parameter lists are equal. Dialect synthesis tests rely on this
/// structural equality rather than byte-for-byte text comparison.
#[derive(Debug, Clone)]
pub struct SqlCommand {
    text: String,
    params: Vec<(String, SqlValue)>,
}

impl SqlCommand {
    /// Creates a command with no parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    /// Creates a command with the given parameter list.
    pub fn with_params(text: impl Into<String>, params: Vec<(String, SqlValue)>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// The SQL text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The ordered parameter list.
    #[must_use]
    pub fn params(&self) -> &[(String, SqlValue)] {
        &self.params
    }

    fn normalized_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl PartialEq for SqlCommand {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_text() == other.normalized_text() && self.params == other.params
    }
}
