//! Timeout-protected pattern compilation
//! Author: kartik4091

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::Pattern;
use crate::error::PatternError;

/// Default budget for compiling one pattern.
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound on the compiled program size of a single pattern.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A pattern paired with its compiled regex
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: Pattern,
    regex: Regex,
}

impl CompiledPattern {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        &self.pattern.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compiles patterns on a helper thread and gives up after `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct PatternCompiler {
    timeout: Duration,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILE_TIMEOUT)
    }
}

impl PatternCompiler {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Compiles `pattern`, failing fast on empty or malformed expressions.
    pub fn compile(&self, pattern: &Pattern) -> Result<CompiledPattern, PatternError> {
        if pattern.expression.trim().is_empty() {
            return Err(PatternError::EmptyExpression {
                name: pattern.name.clone(),
            });
        }

        let (tx, rx) = mpsc::channel();
        let expression = pattern.expression.clone();
        let case_sensitive = pattern.case_sensitive;
        thread::spawn(move || {
            let built = RegexBuilder::new(&expression)
                .case_insensitive(!case_sensitive)
                .size_limit(REGEX_SIZE_LIMIT)
                .build();
            // The receiver is gone when the caller already timed out.
            let _ = tx.send(built);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(regex)) => {
                debug!(pattern = %pattern.name, "Compiled pattern");
                Ok(CompiledPattern {
                    pattern: pattern.clone(),
                    regex,
                })
            }
            Ok(Err(source)) => Err(PatternError::InvalidExpression {
                name: pattern.name.clone(),
                source,
            }),
            Err(_) => {
                warn!(pattern = %pattern.name, "Pattern compilation timed out");
                Err(PatternError::CompileTimeout {
                    name: pattern.name.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    pub fn compile_all(&self, patterns: &[Pattern]) -> Result<Vec<CompiledPattern>, PatternError> {
        patterns.iter().map(|p| self.compile(p)).collect()
    }
}
