//! Built-in pattern database for regulated document content
//! Author: kartik4091

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use super::Pattern;
use crate::error::PatternError;

/// Pattern name of the designation entry. Composite replacements key off it.
pub const DESIGNATION: &str = "Designation";
pub const EMAIL: &str = "Email";
pub const PHONE: &str = "Phone";
pub const PERSON_NAME: &str = "PersonName";
pub const URL: &str = "Url";

/// Static description of a built-in pattern
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPattern {
    /// Pattern expression (regex syntax)
    pub expression: &'static str,

    /// Case sensitive matching
    pub case_sensitive: bool,

    /// Human readable summary
    pub description: &'static str,
}

lazy_static! {
    static ref BUILTIN_PATTERNS: BTreeMap<&'static str, BuiltinPattern> = {
        let mut m = BTreeMap::new();
        // ORG.123456.789 with optional -01 execution number and a short
        // standard marker such as "SB" or "СБ".
        m.insert(DESIGNATION, BuiltinPattern {
            expression: r"\b(?:[A-Z]{2,6}|[А-ЯЁ]{2,6})\.\d{2,6}(?:\.\d{2,4})+(?:-\d{2,3})?(?:\s?(?:[A-Z]{1,3}|[А-ЯЁ]{1,3})\d?\b)?",
            case_sensitive: true,
            description: "Dot-segmented product/document designation",
        });
        m.insert(EMAIL, BuiltinPattern {
            expression: r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}",
            case_sensitive: false,
            description: "E-mail address",
        });
        m.insert(PHONE, BuiltinPattern {
            expression: r"(?:\+\d{1,3}[\s\-.]?)?\(?\b\d{3}\)?[\s\-.]?\d{3}[\s\-.]?\d{2}[\s\-.]?\d{2}\b",
            case_sensitive: true,
            description: "Phone number",
        });
        m.insert(PERSON_NAME, BuiltinPattern {
            expression: r"\b\p{Lu}\p{Ll}+\s\p{Lu}\.\s?\p{Lu}\.|\b\p{Lu}\.\s?\p{Lu}\.\s?\p{Lu}\p{Ll}+",
            case_sensitive: true,
            description: "Surname with initials",
        });
        m.insert(URL, BuiltinPattern {
            expression: r#"https?://[^\s<>"]+"#,
            case_sensitive: false,
            description: "Web address",
        });
        m
    };
}

/// Looks up a built-in pattern by name.
pub fn builtin(name: &str) -> Result<Pattern, PatternError> {
    BUILTIN_PATTERNS
        .get(name)
        .map(|p| Pattern::new(name, p.expression, p.case_sensitive))
        .ok_or_else(|| PatternError::UnknownBuiltin(name.to_string()))
}

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_PATTERNS.keys().copied()
}

pub fn describe(name: &str) -> Option<&'static str> {
    BUILTIN_PATTERNS.get(name).map(|p| p.description)
}
