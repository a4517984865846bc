//! Fixed code set search strategy
//! Author: kartik4091
//!
//! Finds literal organization codes harvested during the first pass. A code
//! only matches as a standalone token: the char before it must not be
//! alphanumeric, and the char after it must not be alphanumeric unless it is
//! a `.` separator.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use super::{MatchIter, SearchStrategy};
use crate::error::PatternError;
use crate::types::TextMatch;
use crate::utils::text::CharCursor;

/// Match type reported for fixed code matches.
pub const ORGANIZATION_CODE: &str = "OrganizationCode";

#[derive(Debug, Clone)]
pub struct FixedCodeSearchStrategy {
    case_sensitive: bool,
    codes: BTreeSet<String>,
    matchers: Vec<Regex>,
}

impl FixedCodeSearchStrategy {
    pub fn new<I, S>(codes: I, case_sensitive: bool) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut strategy = Self {
            case_sensitive,
            codes: BTreeSet::new(),
            matchers: Vec::new(),
        };
        strategy.add_codes(codes)?;
        Ok(strategy)
    }

    /// Adds codes to the set; blank and already known codes are ignored.
    pub fn add_codes<I, S>(&mut self, codes: I) -> Result<(), PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut changed = false;
        for code in codes {
            let code = code.into().trim().to_string();
            if !code.is_empty() && self.codes.insert(code) {
                changed = true;
            }
        }
        if changed {
            self.matchers = self
                .codes
                .iter()
                .map(|code| {
                    RegexBuilder::new(&regex::escape(code))
                        .case_insensitive(!self.case_sensitive)
                        .build()
                        .map_err(|source| PatternError::InvalidExpression {
                            name: code.clone(),
                            source,
                        })
                })
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    pub fn codes(&self) -> &BTreeSet<String> {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn scan<'a>(&'a self, text: &'a str, distinct: bool) -> MatchIter<'a> {
        Box::new(self.matchers.iter().flat_map(move |regex| {
            let mut cursor = CharCursor::new(text);
            let mut seen: HashSet<&'a str> = HashSet::new();
            regex
                .find_iter(text)
                .filter(move |m| is_standalone(text, m.start(), m.end()))
                .filter_map(move |m| {
                    let start = cursor.char_index(m.start());
                    if distinct && !seen.insert(m.as_str()) {
                        return None;
                    }
                    Some(TextMatch::new(m.as_str(), start, ORGANIZATION_CODE))
                })
        }))
    }
}

/// Boundary rule for literal code hits at bytes `[start, end)`.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    if let Some(before) = text[..start].chars().next_back() {
        if before.is_alphanumeric() {
            return false;
        }
    }
    if let Some(after) = text[end..].chars().next() {
        if after.is_alphanumeric() && after != '.' {
            return false;
        }
    }
    true
}

impl SearchStrategy for FixedCodeSearchStrategy {
    fn name(&self) -> &str {
        "FixedCodes"
    }

    fn find_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        self.scan(text, true)
    }

    fn find_all_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        self.scan(text, false)
    }

    fn ignoring_case(&self) -> Option<Arc<dyn SearchStrategy>> {
        if !self.case_sensitive {
            return None;
        }
        // Escaped literals already compiled once, so rebuilding cannot fail.
        Self::new(self.codes.iter().cloned(), false)
            .ok()
            .map(|strategy| Arc::new(strategy) as Arc<dyn SearchStrategy>)
    }
}
