//! Designation-aware replacements
//! Author: kartik4091
//!
//! A designation is `CODE.GROUP.NUMBER`. Both strategies split on the first
//! `.` and leave the value unchanged when there is no dot or the dot is the
//! first or last char.

use super::ReplacementStrategy;
use crate::error::ReplacementError;
use crate::types::{Replacement, TextMatch};

/// Splits `value` at its first `.` into organization code and remainder.
pub fn split_designation(value: &str) -> Option<(&str, &str)> {
    let dot = value.find('.')?;
    if dot == 0 || dot + 1 == value.len() {
        return None;
    }
    Some((&value[..dot], &value[dot + 1..]))
}

/// `ORG.123.456` becomes `123.456`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalDesignationStrip;

impl ReplacementStrategy for DecimalDesignationStrip {
    fn name(&self) -> &str {
        "DecimalDesignationStrip"
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        let text = match split_designation(m.value()) {
            Some((_, rest)) => rest.to_string(),
            None => m.value().to_string(),
        };
        Ok(Replacement::text(text))
    }
}

/// Masks the organization code inside a designation and reports it.
///
/// `ACME.123.456` becomes `****.123.456` with `ACME` in
/// [`Replacement::extracted_codes`]. Every occurrence of the code inside the
/// value is masked, not only the leading one.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationCodeRemoval {
    mask: char,
}

impl Default for OrganizationCodeRemoval {
    fn default() -> Self {
        Self { mask: '*' }
    }
}

impl OrganizationCodeRemoval {
    pub fn with_mask(mask: char) -> Self {
        Self { mask }
    }

    /// Organization code of `value`, if it is a well-formed designation.
    pub fn extract_code(value: &str) -> Option<&str> {
        split_designation(value).map(|(code, _)| code)
    }
}

impl ReplacementStrategy for OrganizationCodeRemoval {
    fn name(&self) -> &str {
        "OrganizationCodeRemoval"
    }

    fn replace(&self, m: &TextMatch) -> Result<Replacement, ReplacementError> {
        let value = m.value();
        if split_designation(value).is_none() {
            return Ok(Replacement::text(value));
        }
        let Some(code) = Self::extract_code(value) else {
            return Ok(Replacement::text(value));
        };
        let masked: String = std::iter::repeat(self.mask).take(code.chars().count()).collect();
        Ok(Replacement::with_code(value.replace(code, &masked), code))
    }

    fn extracts_codes(&self) -> bool {
        true
    }
}
