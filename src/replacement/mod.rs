//! Replacement strategies: map one match to its replacement text
//! Author: kartik4091
//!
//! Strategies are pure. Organization codes extracted while replacing are
//! returned in the [`Replacement`] and collected by the caller into a
//! [`CodeAccumulator`] owned by the processing run.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ReplacementError;
use crate::types::{Replacement, TextMatch};

pub mod basic;
pub mod composite;
pub mod designation;
pub mod transform;

pub use basic::{ConstantStrategy, MaskStrategy, RemoveStrategy};
pub use composite::{ChainStrategy, CompositeStrategy, MatchCondition};
pub use designation::{split_designation, DecimalDesignationStrip, OrganizationCodeRemoval};
pub use transform::{TextTransform, TransformStrategy};

pub trait ReplacementStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError>;

    /// Whether this strategy (or one it delegates to) reports extracted
    /// organization codes.
    fn extracts_codes(&self) -> bool {
        false
    }
}

/// Organization codes harvested during one document run.
///
/// Created per run and read between passes. Reusing one accumulator for
/// several documents requires `clear()` in between, otherwise codes from one
/// document are searched for in the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeAccumulator {
    codes: BTreeSet<String>,
}

impl CodeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the code was not known yet.
    pub fn record(&mut self, code: impl Into<String>) -> bool {
        self.codes.insert(code.into())
    }

    pub fn record_all(&mut self, replacement: &Replacement) {
        for code in &replacement.extracted_codes {
            self.record(code.clone());
        }
    }

    pub fn extracted_codes(&self) -> &BTreeSet<String> {
        &self.codes
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
