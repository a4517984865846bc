//! Remove, mask and constant replacements

use super::ReplacementStrategy;
use crate::error::ReplacementError;
use crate::types::{Replacement, TextMatch};

/// Replaces every match with nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveStrategy;

impl ReplacementStrategy for RemoveStrategy {
    fn name(&self) -> &str {
        "Remove"
    }

    fn replace(&self, _m: &TextMatch) -> Result<Replacement, ReplacementError> {
        Ok(Replacement::text(""))
    }
}

/// Replaces every char of the match with the mask char (`*` by default).
#[derive(Debug, Clone, Copy)]
pub struct MaskStrategy {
    mask: char,
}

impl Default for MaskStrategy {
    fn default() -> Self {
        Self { mask: '*' }
    }
}

impl MaskStrategy {
    pub fn with_char(mask: char) -> Self {
        Self { mask }
    }
}

impl ReplacementStrategy for MaskStrategy {
    fn name(&self) -> &str {
        "Mask"
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        Ok(Replacement::text(
            std::iter::repeat(self.mask).take(m.length()).collect::<String>(),
        ))
    }
}

/// Replaces every match with a fixed string.
#[derive(Debug, Clone, Default)]
pub struct ConstantStrategy {
    value: String,
}

impl ConstantStrategy {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl ReplacementStrategy for ConstantStrategy {
    fn name(&self) -> &str {
        "Constant"
    }

    fn replace(&self, _m: &TextMatch) -> Result<Replacement, ReplacementError> {
        Ok(Replacement::text(self.value.clone()))
    }
}
