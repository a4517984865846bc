//! Handler for document properties

use tracing::{debug, warn};

use super::{anonymize_fragments, ElementHandler};
use crate::config::ProcessingOptions;
use crate::document::DocumentAccess;
use crate::error::Result;
use crate::observer::ProcessingEvent;
use crate::pipeline::ProcessingConfiguration;
use crate::replacement::CodeAccumulator;
use crate::types::ProcessingResult;

const AREA: &str = "Properties";

/// Treats each property value as a single-fragment block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesHandler;

impl ElementHandler for PropertiesHandler {
    fn name(&self) -> &str {
        AREA
    }

    fn is_enabled(&self, options: &ProcessingOptions) -> bool {
        options.process_properties
    }

    fn handle(
        &self,
        document: &mut dyn DocumentAccess,
        config: &ProcessingConfiguration,
        codes: &mut CodeAccumulator,
    ) -> Result<ProcessingResult> {
        if !self.is_enabled(config.options()) {
            config.notify(&ProcessingEvent::AreaSkipped { area: AREA });
            return Ok(ProcessingResult::new());
        }

        let store = match document.properties() {
            Ok(store) => store,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Property store inaccessible");
                config.notify(&ProcessingEvent::AreaFailed { area: AREA, message: &message });
                let mut result = ProcessingResult::new();
                result.add_error(message);
                return Ok(result);
            }
        };

        let mut result = ProcessingResult::new();
        for (key, value) in store.list_text_properties() {
            if value.is_empty() {
                continue;
            }
            let (editor, mut item_result) = anonymize_fragments(&[value.as_str()], config, codes, AREA);
            if editor.is_modified() {
                if let Err(e) = store.set_text_property(&key, &editor.text()) {
                    let message = format!("{AREA}: {e}");
                    config.notify(&ProcessingEvent::ItemWarning { area: AREA, message: &message });
                    item_result.matches_processed = 0;
                    item_result.add_warning(message);
                }
            }
            result.merge(item_result);
        }

        debug!(found = result.matches_found, processed = result.matches_processed, "Properties processed");
        Ok(result)
    }
}
