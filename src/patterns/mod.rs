//! Pattern definitions and the pattern matcher used by pattern-based search
//! Author: kartik4091

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::TextMatch;
use crate::utils::text::CharCursor;

pub mod compiler;
pub mod database;

pub use compiler::{CompiledPattern, PatternCompiler, DEFAULT_COMPILE_TIMEOUT};

/// Named search expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Pattern name, reported as the match type
    pub name: String,

    /// Expression in regex syntax
    pub expression: String,

    /// Case sensitive matching
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

impl Pattern {
    pub fn new(name: impl Into<String>, expression: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            case_sensitive,
        }
    }
}

/// Evaluates compiled patterns against a text block.
///
/// Patterns run in declaration order. Within one pattern, a value that was
/// already yielded is skipped when `distinct` is set; different patterns never
/// suppress each other.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<CompiledPattern>,
}

impl PatternMatcher {
    pub fn new(patterns: Vec<CompiledPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches<'a>(&'a self, text: &'a str, distinct: bool) -> impl Iterator<Item = TextMatch> + 'a {
        self.patterns
            .iter()
            .flat_map(move |compiled| Self::pattern_matches(compiled, text, distinct))
    }

    fn pattern_matches<'a>(
        compiled: &'a CompiledPattern,
        text: &'a str,
        distinct: bool,
    ) -> impl Iterator<Item = TextMatch> + 'a {
        let mut cursor = CharCursor::new(text);
        let mut seen: HashSet<&'a str> = HashSet::new();
        compiled
            .regex()
            .find_iter(text)
            .filter(|m| !m.as_str().is_empty())
            .filter_map(move |m| {
                let start = cursor.char_index(m.start());
                if distinct && !seen.insert(m.as_str()) {
                    return None;
                }
                Some(
                    TextMatch::new(m.as_str(), start, compiled.name())
                        .with_metadata("byteStart", m.start()),
                )
            })
    }
}
