//! Literal token scanning and substitution.
//!
//! A `{=Member}` token in SQL text asks for the member's value to be
//! spliced in as a literal instead of bound. Only kinds that render safely
//! (numerics, booleans, dates) are allowed; anything else is rejected.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use kestrel_core::SqlValue;
use regex::Regex;
use tracing::debug;

use crate::error::{BindError, Result};

/// One `{=Member}` occurrence in a SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralToken {
    token: String,
    member: String,
}

impl LiteralToken {
    /// The full token, including braces.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The member name between `{=` and `}`.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }
}

fn literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{=([[:alnum:]_]+)\}").expect("literal token pattern is valid")
    })
}

fn scan(sql: &str) -> Vec<LiteralToken> {
    literal_pattern()
        .captures_iter(sql)
        .map(|captures| LiteralToken {
            token: String::from(&captures[0]),
            member: String::from(&captures[1]),
        })
        .collect()
}

/// Per-text cache of literal token scans.
///
/// Scanning is pure, so results for a given text never change; they are
/// built once and shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct LiteralCache {
    cache: RwLock<HashMap<String, Arc<[LiteralToken]>>>,
}

impl LiteralCache {
    /// The literal tokens of `sql`, scanning on first sight of the text.
    pub fn tokens(&self, sql: &str) -> Arc<[LiteralToken]> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(tokens) = cache.get(sql) {
                return Arc::clone(tokens);
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(tokens) = cache.get(sql) {
            return Arc::clone(tokens);
        }

        let tokens: Arc<[LiteralToken]> = scan(sql).into();
        debug!(count = tokens.len(), "scanned literal tokens");
        cache.insert(String::from(sql), Arc::clone(&tokens));
        tokens
    }
}

/// Replaces every token occurrence in `text` with its member's rendered
/// literal. `lookup` supplies member values; a member without a value is a
/// [`BindError::MissingParameter`], an unrenderable value a
/// [`BindError::UnsafeLiteral`].
pub fn replace_literals(
    text: &str,
    tokens: &[LiteralToken],
    mut lookup: impl FnMut(&str) -> Option<SqlValue>,
) -> Result<String> {
    let mut result = String::from(text);
    for token in tokens {
        let value = lookup(token.member())
            .ok_or_else(|| BindError::MissingParameter(String::from(token.member())))?;
        let literal = value.to_sql_literal().map_err(|_| BindError::UnsafeLiteral {
            member: String::from(token.member()),
            kind: value.kind_name(),
        })?;
        result = result.replace(token.token(), &literal);
    }
    Ok(result)
}
