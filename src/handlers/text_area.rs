//! Handler for areas stored as blocks of text runs

use tracing::{debug, warn};

use super::{anonymize_fragments, ElementHandler};
use crate::config::ProcessingOptions;
use crate::document::{AreaKind, DocumentAccess};
use crate::error::Result;
use crate::observer::ProcessingEvent;
use crate::pipeline::ProcessingConfiguration;
use crate::replacement::CodeAccumulator;
use crate::types::ProcessingResult;

#[derive(Debug, Clone, Copy)]
pub struct TextAreaHandler {
    area: AreaKind,
}

impl TextAreaHandler {
    pub fn new(area: AreaKind) -> Self {
        Self { area }
    }

    pub fn area(&self) -> AreaKind {
        self.area
    }
}

impl ElementHandler for TextAreaHandler {
    fn name(&self) -> &str {
        self.area.as_str()
    }

    fn is_enabled(&self, options: &ProcessingOptions) -> bool {
        match self.area {
            AreaKind::Body => true,
            AreaKind::Headers => options.process_headers,
            AreaKind::Footers => options.process_footers,
            AreaKind::TextBoxes => options.process_text_boxes,
            AreaKind::Notes => options.process_notes,
        }
    }

    fn handle(
        &self,
        document: &mut dyn DocumentAccess,
        config: &ProcessingConfiguration,
        codes: &mut CodeAccumulator,
    ) -> Result<ProcessingResult> {
        let area = self.area.as_str();
        if !self.is_enabled(config.options()) {
            config.notify(&ProcessingEvent::AreaSkipped { area });
            return Ok(ProcessingResult::new());
        }

        let container = match document.text_area(self.area) {
            Ok(container) => container,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                let message = e.to_string();
                warn!(area, error = %message, "Area inaccessible");
                config.notify(&ProcessingEvent::AreaFailed { area, message: &message });
                let mut result = ProcessingResult::new();
                result.add_error(message);
                return Ok(result);
            }
        };

        let mut result = ProcessingResult::new();
        for block in 0..container.block_count() {
            let Some(fragments) = container.fragments(block) else {
                result.add_warning(format!("{area}: block {block} disappeared"));
                continue;
            };
            if fragments.is_empty() {
                continue;
            }

            let (editor, mut block_result) = anonymize_fragments(&fragments, config, codes, area);
            let instructions = editor.instructions();
            if !instructions.is_empty() {
                if let Err(e) = container.apply_instructions(block, &instructions) {
                    let message = format!("{area}: {e}");
                    config.notify(&ProcessingEvent::ItemWarning { area, message: &message });
                    block_result.matches_processed = 0;
                    block_result.add_warning(message);
                }
            }
            result.merge(block_result);
        }

        debug!(area, found = result.matches_found, processed = result.matches_processed, "Area processed");
        Ok(result)
    }
}
