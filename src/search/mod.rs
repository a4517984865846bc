//! Search strategies: uniform "find matches in text" contract
//! Author: kartik4091
//!
//! Every strategy is a pure function of the input text and its own pattern
//! or code set, so the returned iterators can be restarted by calling again.

use std::fmt;
use std::iter;
use std::sync::Arc;

use crate::types::TextMatch;

pub mod fixed_codes;
pub mod pattern;

pub use fixed_codes::FixedCodeSearchStrategy;
pub use pattern::PatternSearchStrategy;

/// Lazy, finite sequence of matches.
pub type MatchIter<'a> = Box<dyn Iterator<Item = TextMatch> + 'a>;

pub trait SearchStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Matches with repeated literal values collapsed: the first occurrence
    /// of a value is yielded, later identical values are not.
    fn find_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a>;

    /// Every positional occurrence, same rules otherwise.
    fn find_all_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a>;

    /// `find_matches` over optional text; `None` yields nothing.
    fn find_matches_in<'a>(&'a self, text: Option<&'a str>) -> MatchIter<'a> {
        match text {
            Some(text) => self.find_matches(text),
            None => Box::new(iter::empty()),
        }
    }

    /// Copy of this strategy that matches regardless of case, or `None` when
    /// it already does.
    fn ignoring_case(&self) -> Option<Arc<dyn SearchStrategy>> {
        None
    }
}

/// Concatenation of several strategies, queried in order.
#[derive(Debug, Clone, Default)]
pub struct CompositeSearchStrategy {
    strategies: Vec<Arc<dyn SearchStrategy>>,
}

impl CompositeSearchStrategy {
    pub fn new(strategies: Vec<Arc<dyn SearchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn push(&mut self, strategy: Arc<dyn SearchStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl SearchStrategy for CompositeSearchStrategy {
    fn name(&self) -> &str {
        "Composite"
    }

    fn find_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        Box::new(self.strategies.iter().flat_map(move |s| s.find_matches(text)))
    }

    fn find_all_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        Box::new(self.strategies.iter().flat_map(move |s| s.find_all_matches(text)))
    }

    fn ignoring_case(&self) -> Option<Arc<dyn SearchStrategy>> {
        let folded: Vec<_> = self.strategies.iter().map(|s| s.ignoring_case()).collect();
        if folded.iter().all(Option::is_none) {
            return None;
        }
        let strategies = folded
            .into_iter()
            .zip(&self.strategies)
            .map(|(folded, original)| folded.unwrap_or_else(|| original.clone()))
            .collect();
        Some(Arc::new(Self::new(strategies)))
    }
}
