//! Text-range editor over fragmented text storage
//! Author: kartik4091
//!
//! A text block is stored as an ordered list of fragments (runs). Matches are
//! found on the flattened projection, so one match may cover several
//! fragments. The editor applies a replacement at a projection offset, keeps
//! fragment boundaries outside the edited range intact, and produces the
//! per-fragment instructions the storage adapter has to execute.

use thiserror::Error;
use tracing::trace;

use crate::utils::text::{char_len, splice_chars, byte_offset};

/// A contiguous run of text backed by one storage fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElementInfo {
    /// Offset in the flattened projection, in chars
    pub start_index: usize,

    /// Length in chars
    pub length: usize,

    /// Current content
    pub content: String,

    /// Index of the owning fragment in the adapter's storage
    pub owner: usize,

    /// Marked for removal
    pub removed: bool,
}

impl TextElementInfo {
    fn end_index(&self) -> usize {
        self.start_index + self.length
    }

    fn intersects(&self, start: usize, end: usize) -> bool {
        !self.removed && self.length > 0 && self.start_index < end && self.end_index() > start
    }
}

/// Change to apply to one storage fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentInstruction {
    Update { fragment: usize, content: String },
    Remove { fragment: usize },
}

impl FragmentInstruction {
    pub fn fragment(&self) -> usize {
        match self {
            FragmentInstruction::Update { fragment, .. } | FragmentInstruction::Remove { fragment } => *fragment,
        }
    }
}

/// Why an edit could not be applied. The editor is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditFailure {
    #[error("no fragments")]
    NoFragments,

    #[error("no affected fragments for range {start}+{length}")]
    NoAffectedFragments { start: usize, length: usize },

    #[error("range {start}+{length} out of range")]
    OutOfRange { start: usize, length: usize },
}

/// What a successful edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditSummary {
    pub affected_fragments: usize,
    pub removed_fragments: usize,
}

/// One replacement waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub start: usize,
    pub length: usize,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct TextRangeEditor {
    elements: Vec<TextElementInfo>,
    original: Vec<String>,
}

impl TextRangeEditor {
    pub fn new<S: AsRef<str>>(fragments: &[S]) -> Self {
        let original: Vec<String> = fragments.iter().map(|f| f.as_ref().to_string()).collect();
        let elements = original
            .iter()
            .enumerate()
            .map(|(owner, content)| TextElementInfo {
                start_index: 0,
                length: 0,
                content: content.clone(),
                owner,
                removed: false,
            })
            .collect();
        let mut editor = Self { elements, original };
        editor.rebuild_map();
        editor
    }

    /// Recomputes offsets by cumulative sum over live fragments.
    fn rebuild_map(&mut self) {
        let mut offset = 0;
        for element in &mut self.elements {
            element.start_index = offset;
            element.length = if element.removed { 0 } else { char_len(&element.content) };
            offset += element.length;
        }
    }

    pub fn elements(&self) -> &[TextElementInfo] {
        &self.elements
    }

    /// Flattened projection of the current contents.
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .filter(|e| !e.removed)
            .map(|e| e.content.as_str())
            .collect()
    }

    /// Number of fragments not marked for removal.
    pub fn fragment_count(&self) -> usize {
        self.elements.iter().filter(|e| !e.removed).count()
    }

    pub fn is_modified(&self) -> bool {
        !self.instructions().is_empty()
    }

    /// Replaces chars `[start, start + length)` of the projection.
    pub fn replace_range(
        &mut self,
        start: usize,
        length: usize,
        replacement: &str,
    ) -> Result<EditSummary, EditFailure> {
        if self.elements.is_empty() {
            return Err(EditFailure::NoFragments);
        }
        if length == 0 {
            return Err(EditFailure::NoAffectedFragments { start, length });
        }
        let end = start + length;
        let affected: Vec<usize> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.intersects(start, end))
            .map(|(i, _)| i)
            .collect();
        let (Some(&first), Some(&last)) = (affected.first(), affected.last()) else {
            return Err(EditFailure::NoAffectedFragments { start, length });
        };

        let out_of_range = EditFailure::OutOfRange { start, length };
        let first_local = start
            .checked_sub(self.elements[first].start_index)
            .ok_or_else(|| out_of_range.clone())?;
        let last_local_end = end
            .checked_sub(self.elements[last].start_index)
            .filter(|&local| local <= self.elements[last].length)
            .ok_or_else(|| out_of_range.clone())?;

        // Compute every new content before touching state.
        let mut updates: Vec<(usize, String)> = Vec::with_capacity(affected.len());
        if first == last {
            let content = splice_chars(
                &self.elements[first].content,
                first_local,
                length,
                replacement,
            )
            .ok_or(out_of_range)?;
            updates.push((first, content));
        } else {
            let head = &self.elements[first].content;
            let cut = byte_offset(head, first_local).ok_or_else(|| out_of_range.clone())?;
            updates.push((first, format!("{}{}", &head[..cut], replacement)));

            for &interior in &affected[1..affected.len() - 1] {
                updates.push((interior, String::new()));
            }

            let tail = &self.elements[last].content;
            let cut = byte_offset(tail, last_local_end).ok_or(out_of_range)?;
            updates.push((last, tail[cut..].to_string()));
        }

        let mut summary = EditSummary {
            affected_fragments: updates.len(),
            removed_fragments: 0,
        };
        for (index, content) in updates {
            let element = &mut self.elements[index];
            if content.is_empty() {
                element.removed = true;
                element.content.clear();
                summary.removed_fragments += 1;
            } else {
                element.content = content;
            }
        }
        self.rebuild_map();
        trace!(start, length, ?summary, "Applied range edit");
        Ok(summary)
    }

    /// Applies edits highest offset first so lower offsets stay valid.
    pub fn apply_back_to_front(
        &mut self,
        mut edits: Vec<PendingEdit>,
    ) -> Vec<(PendingEdit, Result<EditSummary, EditFailure>)> {
        edits.sort_by(|a, b| b.start.cmp(&a.start));
        edits
            .into_iter()
            .map(|edit| {
                let outcome = self.replace_range(edit.start, edit.length, &edit.replacement);
                (edit, outcome)
            })
            .collect()
    }

    /// Instructions turning the original fragments into the current ones.
    pub fn instructions(&self) -> Vec<FragmentInstruction> {
        self.elements
            .iter()
            .filter_map(|e| {
                if e.removed {
                    Some(FragmentInstruction::Remove { fragment: e.owner })
                } else if e.content != self.original[e.owner] {
                    Some(FragmentInstruction::Update {
                        fragment: e.owner,
                        content: e.content.clone(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
