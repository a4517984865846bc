//! Document adapter contract
//! Author: kartik4091
//!
//! The engine never reads container formats itself. An adapter exposes each
//! structural area as text blocks made of fragments, and document properties
//! as a flat key/value store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::editor::FragmentInstruction;
use crate::error::DocumentError;

pub mod memory;

pub use memory::{InMemoryDocument, Paragraph, Property, Run};

/// Structural areas that carry text runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaKind {
    Body,
    Headers,
    Footers,
    TextBoxes,
    Notes,
}

impl AreaKind {
    pub const ALL: [AreaKind; 5] = [
        AreaKind::Body,
        AreaKind::Headers,
        AreaKind::Footers,
        AreaKind::TextBoxes,
        AreaKind::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Body => "Body",
            AreaKind::Headers => "Headers",
            AreaKind::Footers => "Footers",
            AreaKind::TextBoxes => "TextBoxes",
            AreaKind::Notes => "Notes",
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text blocks of one area. A block is a paragraph-like unit whose text is
/// the concatenation of its fragments.
pub trait TextContainer {
    fn block_count(&self) -> usize;

    /// Fragments of block `block`, or `None` if it does not exist.
    fn fragments(&self, block: usize) -> Option<Vec<String>>;

    fn apply_instructions(
        &mut self,
        block: usize,
        instructions: &[FragmentInstruction],
    ) -> Result<(), DocumentError>;
}

/// Key/value text properties (document summary, custom properties).
pub trait PropertyStore {
    fn list_text_properties(&self) -> Vec<(String, String)>;

    fn set_text_property(&mut self, key: &str, value: &str) -> Result<(), DocumentError>;
}

/// Per-document accessor handed to the handler chain.
pub trait DocumentAccess {
    /// Fails with [`DocumentError::Unreadable`] when the document as a whole
    /// is gone, or [`DocumentError::AreaUnavailable`] for one area.
    fn text_area(&mut self, area: AreaKind) -> Result<&mut dyn TextContainer, DocumentError>;

    fn properties(&mut self) -> Result<&mut dyn PropertyStore, DocumentError>;
}
