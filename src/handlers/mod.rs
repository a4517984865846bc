//! Element handler chain
//! Author: kartik4091
//!
//! One handler per structural area. The chain is an ordered list run front
//! to back; each handler runs at most once per pass and results are merged
//! left to right.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::config::ProcessingOptions;
use crate::document::{AreaKind, DocumentAccess};
use crate::editor::{PendingEdit, TextRangeEditor};
use crate::error::Result;
use crate::observer::ProcessingEvent;
use crate::pipeline::ProcessingConfiguration;
use crate::replacement::CodeAccumulator;
use crate::types::{ProcessingResult, TextMatch};

pub mod properties;
pub mod text_area;

pub use properties::PropertiesHandler;
pub use text_area::TextAreaHandler;

pub trait ElementHandler: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn is_enabled(&self, options: &ProcessingOptions) -> bool;

    /// Finds and replaces matches in this handler's area.
    ///
    /// Item and area failures are recorded in the returned result. Only a
    /// document that cannot be read at all yields `Err`.
    fn handle(
        &self,
        document: &mut dyn DocumentAccess,
        config: &ProcessingConfiguration,
        codes: &mut CodeAccumulator,
    ) -> Result<ProcessingResult>;
}

#[derive(Debug, Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn ElementHandler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Box<dyn ElementHandler>>) -> Self {
        Self { handlers }
    }

    /// Body, headers, footers, text boxes, notes, then properties.
    pub fn standard() -> Self {
        let mut handlers: Vec<Box<dyn ElementHandler>> = AreaKind::ALL
            .iter()
            .map(|&area| Box::new(TextAreaHandler::new(area)) as Box<dyn ElementHandler>)
            .collect();
        handlers.push(Box::new(PropertiesHandler));
        Self { handlers }
    }

    pub fn push(&mut self, handler: Box<dyn ElementHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    #[instrument(skip_all, fields(handlers = self.handlers.len()))]
    pub fn run(
        &self,
        document: &mut dyn DocumentAccess,
        config: &ProcessingConfiguration,
        codes: &mut CodeAccumulator,
    ) -> Result<ProcessingResult> {
        let mut result = ProcessingResult::new();
        for handler in &self.handlers {
            let handled = handler.handle(document, config, codes)?;
            debug!(
                handler = handler.name(),
                found = handled.matches_found,
                processed = handled.matches_processed,
                "Handler finished"
            );
            result.merge(handled);
        }
        Ok(result)
    }
}

/// Searches `text` with every strategy of `config`, drops matches below the
/// length floor and resolves overlaps between strategies.
pub fn collect_matches(text: &str, config: &ProcessingConfiguration) -> Vec<TextMatch> {
    let options = config.options();
    let matches = config
        .search_strategies()
        .iter()
        .flat_map(|strategy| {
            if options.replace_every_occurrence {
                strategy.find_all_matches(text)
            } else {
                strategy.find_matches(text)
            }
        })
        .filter(|m| m.length() >= options.min_match_length)
        .collect();
    resolve_overlaps(matches)
}

/// Earliest start wins; on equal starts the longer match wins.
pub fn resolve_overlaps(mut matches: Vec<TextMatch>) -> Vec<TextMatch> {
    matches.sort_by(|a, b| {
        a.start_index()
            .cmp(&b.start_index())
            .then_with(|| b.length().cmp(&a.length()))
    });
    let mut kept: Vec<TextMatch> = Vec::with_capacity(matches.len());
    for m in matches {
        if kept.last().map_or(true, |last| !last.overlaps(&m)) {
            kept.push(m);
        }
    }
    kept
}

/// Replacement edits for one block of text, not yet applied.
#[derive(Debug, Clone, Default)]
pub struct EditPlan {
    pub edits: Vec<PendingEdit>,
    match_types: BTreeMap<usize, String>,
}

impl EditPlan {
    pub fn match_type_at(&self, start: usize) -> Option<&str> {
        self.match_types.get(&start).map(String::as_str)
    }
}

/// Finds matches in `text` and computes their replacements. Extracted codes
/// go into `codes`; a failed replacement becomes a warning.
pub fn plan_edits(
    text: &str,
    config: &ProcessingConfiguration,
    codes: &mut CodeAccumulator,
    area: &str,
    result: &mut ProcessingResult,
) -> EditPlan {
    let matches = collect_matches(text, config);
    result.matches_found += matches.len();

    let mut plan = EditPlan::default();
    for m in &matches {
        match config.replacement().replace(m) {
            Ok(replacement) => {
                codes.record_all(&replacement);
                plan.match_types.insert(m.start_index(), m.match_type().to_string());
                plan.edits.push(PendingEdit {
                    start: m.start_index(),
                    length: m.length(),
                    replacement: replacement.text,
                });
            }
            Err(e) => {
                // Events never carry the matched value.
                let note = format!("{area}: replacement '{}' failed", e.strategy);
                config.notify(&ProcessingEvent::ItemWarning { area, message: &note });
                result.add_warning(format!("{area}: {e}"));
            }
        }
    }
    plan
}

/// Runs search and replacement over one block of fragments and applies the
/// edits back to front. The returned editor holds the fragment instructions.
pub fn anonymize_fragments<S: AsRef<str>>(
    fragments: &[S],
    config: &ProcessingConfiguration,
    codes: &mut CodeAccumulator,
    area: &str,
) -> (TextRangeEditor, ProcessingResult) {
    let mut editor = TextRangeEditor::new(fragments);
    let mut result = ProcessingResult::new();
    let text = editor.text();
    let plan = plan_edits(&text, config, codes, area, &mut result);
    if plan.edits.is_empty() {
        return (editor, result);
    }

    for (edit, outcome) in editor.apply_back_to_front(plan.edits.clone()) {
        match outcome {
            Ok(_) => {
                result.matches_processed += 1;
                config.notify(&ProcessingEvent::MatchReplaced {
                    area,
                    match_type: plan.match_type_at(edit.start).unwrap_or_default(),
                    start: edit.start,
                    length: edit.length,
                });
            }
            Err(failure) => {
                let message = format!("{area}: edit at {}+{} skipped: {failure}", edit.start, edit.length);
                config.notify(&ProcessingEvent::ItemWarning { area, message: &message });
                result.add_warning(message);
            }
        }
    }
    (editor, result)
}
