//! Pattern-based search strategy

use std::sync::Arc;

use tracing::{debug, warn};

use super::{MatchIter, SearchStrategy};
use crate::error::PatternError;
use crate::patterns::{Pattern, PatternCompiler, PatternMatcher};

/// Search strategy backed by one or more named patterns.
#[derive(Debug, Clone)]
pub struct PatternSearchStrategy {
    name: String,
    matcher: PatternMatcher,
    compiler: PatternCompiler,
}

impl PatternSearchStrategy {
    /// Compiles every pattern up front; an invalid expression fails here and
    /// never during matching.
    pub fn new(
        name: impl Into<String>,
        patterns: Vec<Pattern>,
        compiler: &PatternCompiler,
    ) -> Result<Self, PatternError> {
        let name = name.into();
        let compiled = compiler.compile_all(&patterns)?;
        debug!(strategy = %name, patterns = compiled.len(), "Built pattern search strategy");
        Ok(Self {
            name,
            matcher: PatternMatcher::new(compiled),
            compiler: *compiler,
        })
    }

    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.matcher.patterns().iter().map(|p| p.name())
    }
}

impl SearchStrategy for PatternSearchStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        Box::new(self.matcher.matches(text, true))
    }

    fn find_all_matches<'a>(&'a self, text: &'a str) -> MatchIter<'a> {
        Box::new(self.matcher.matches(text, false))
    }

    /// Recompiles the case-sensitive patterns with the same compile budget.
    fn ignoring_case(&self) -> Option<Arc<dyn SearchStrategy>> {
        let patterns = self.matcher.patterns();
        if patterns.iter().all(|p| !p.pattern().case_sensitive) {
            return None;
        }
        let folded = patterns
            .iter()
            .map(|p| Pattern {
                case_sensitive: false,
                ..p.pattern().clone()
            })
            .collect();
        match Self::new(self.name.clone(), folded, &self.compiler) {
            Ok(strategy) => Some(Arc::new(strategy)),
            Err(e) => {
                warn!(strategy = %self.name, error = %e, "Keeping case-sensitive patterns");
                None
            }
        }
    }
}
