//! Conditional and chained replacements

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::ReplacementStrategy;
use crate::error::ReplacementError;
use crate::types::{Replacement, TextMatch};

type MatchPredicate = dyn Fn(&TextMatch) -> bool + Send + Sync;

/// Predicate deciding which branch of a [`CompositeStrategy`] runs.
#[derive(Clone)]
pub enum MatchCondition {
    /// Match type contains the given text
    MatchTypeContains(String),

    /// Match value matches the given regex
    ValueMatches(Regex),

    /// Always take the first branch
    Always,

    /// Caller supplied predicate
    Custom(Arc<MatchPredicate>),
}

impl fmt::Debug for MatchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCondition::MatchTypeContains(s) => f.debug_tuple("MatchTypeContains").field(s).finish(),
            MatchCondition::ValueMatches(re) => f.debug_tuple("ValueMatches").field(&re.as_str()).finish(),
            MatchCondition::Always => f.write_str("Always"),
            MatchCondition::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl MatchCondition {
    pub fn evaluate(&self, m: &TextMatch) -> bool {
        match self {
            MatchCondition::MatchTypeContains(needle) => m.match_type().contains(needle.as_str()),
            MatchCondition::ValueMatches(re) => re.is_match(m.value()),
            MatchCondition::Always => true,
            MatchCondition::Custom(predicate) => predicate(m),
        }
    }
}

/// Delegates to `then` when the condition holds, otherwise to `otherwise`.
#[derive(Debug, Clone)]
pub struct CompositeStrategy {
    condition: MatchCondition,
    then: Arc<dyn ReplacementStrategy>,
    otherwise: Arc<dyn ReplacementStrategy>,
}

impl CompositeStrategy {
    pub fn new(
        condition: MatchCondition,
        then: Arc<dyn ReplacementStrategy>,
        otherwise: Arc<dyn ReplacementStrategy>,
    ) -> Self {
        Self {
            condition,
            then,
            otherwise,
        }
    }
}

impl ReplacementStrategy for CompositeStrategy {
    fn name(&self) -> &str {
        "Composite"
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        if self.condition.evaluate(m) {
            self.then.replace(m)
        } else {
            self.otherwise.replace(m)
        }
    }

    fn extracts_codes(&self) -> bool {
        self.then.extracts_codes() || self.otherwise.extracts_codes()
    }
}

/// Applies strategies in sequence, each one seeing the previous output as
/// the match value. Extracted codes from every step are kept.
#[derive(Debug, Clone, Default)]
pub struct ChainStrategy {
    steps: Vec<Arc<dyn ReplacementStrategy>>,
}

impl ChainStrategy {
    pub fn new(steps: Vec<Arc<dyn ReplacementStrategy>>) -> Self {
        Self { steps }
    }
}

impl ReplacementStrategy for ChainStrategy {
    fn name(&self) -> &str {
        "Chain"
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        let mut current = m.clone();
        let mut codes = Vec::new();
        for step in &self.steps {
            let out = step.replace(&current)?;
            codes.extend(out.extracted_codes);
            current = current.derive(out.text);
        }
        Ok(Replacement {
            text: current.value().to_string(),
            extracted_codes: codes,
        })
    }

    fn extracts_codes(&self) -> bool {
        self.steps.iter().any(|s| s.extracts_codes())
    }
}
