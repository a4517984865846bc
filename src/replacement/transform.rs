//! Transform-based replacements

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ReplacementStrategy;
use crate::error::ReplacementError;
use crate::types::{Replacement, TextMatch};

/// Built-in value transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTransform {
    Uppercase,
    Lowercase,
    /// `Ivanov I.I.` becomes `I.I.I.`
    Initials,
    /// Every alphanumeric char becomes `X`; punctuation and spacing stay.
    Redact,
}

impl TextTransform {
    pub fn apply(&self, value: &str) -> String {
        match self {
            TextTransform::Uppercase => value.to_uppercase(),
            TextTransform::Lowercase => value.to_lowercase(),
            TextTransform::Initials => value
                .split_whitespace()
                .flat_map(|word| word.split('.'))
                .filter_map(|part| part.chars().find(|c| c.is_alphabetic()))
                .map(|c| format!("{c}."))
                .collect(),
            TextTransform::Redact => value
                .chars()
                .map(|c| if c.is_alphanumeric() { 'X' } else { c })
                .collect(),
        }
    }
}

type TransformFn = dyn Fn(&str) -> Result<String, String> + Send + Sync;

#[derive(Clone)]
enum TransformKind {
    Builtin(TextTransform),
    Custom { name: String, func: Arc<TransformFn> },
}

/// Replaces the match with a function of its value.
#[derive(Clone)]
pub struct TransformStrategy {
    kind: TransformKind,
}

impl fmt::Debug for TransformStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TransformKind::Builtin(t) => f.debug_tuple("TransformStrategy").field(t).finish(),
            TransformKind::Custom { name, .. } => f.debug_tuple("TransformStrategy").field(name).finish(),
        }
    }
}

impl TransformStrategy {
    pub fn builtin(transform: TextTransform) -> Self {
        Self {
            kind: TransformKind::Builtin(transform),
        }
    }

    /// Wraps a fallible closure; an `Err` becomes a per-match failure.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            kind: TransformKind::Custom {
                name: name.into(),
                func: Arc::new(func),
            },
        }
    }
}

impl ReplacementStrategy for TransformStrategy {
    fn name(&self) -> &str {
        match &self.kind {
            TransformKind::Builtin(_) => "Transform",
            TransformKind::Custom { name, .. } => name,
        }
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        match &self.kind {
            TransformKind::Builtin(t) => Ok(Replacement::text(t.apply(m.value()))),
            TransformKind::Custom { name, func } => func(m.value())
                .map(Replacement::text)
                .map_err(|reason| ReplacementError {
                    strategy: name.clone(),
                    value: m.value().to_string(),
                    reason,
                }),
        }
    }
}
