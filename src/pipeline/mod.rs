//! Two-pass anonymization pipeline
//! Author: kartik4091
//!
//! Pass one replaces designations and harvests their organization codes.
//! Pass two sweeps the whole document again for standalone mentions of
//! exactly those codes.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::config::ProcessingOptions;
use crate::document::{AreaKind, DocumentAccess, InMemoryDocument};
use crate::error::{ConfigError, Result};
use crate::handlers::{anonymize_fragments, HandlerChain};
use crate::observer::{ProcessingEvent, ProcessingObserver};
use crate::replacement::{CodeAccumulator, ReplacementStrategy};
use crate::search::{FixedCodeSearchStrategy, SearchStrategy};
use crate::types::{ProcessingResult, CODES_REMOVED_KEY};

pub mod batch;

pub use batch::{BatchProcessor, CancellationFlag};

/// Search strategies, one replacement strategy and options for one pass.
#[derive(Debug, Clone)]
pub struct ProcessingConfiguration {
    search_strategies: Vec<Arc<dyn SearchStrategy>>,
    replacement: Arc<dyn ReplacementStrategy>,
    options: ProcessingOptions,
    observer: Option<Arc<dyn ProcessingObserver>>,
}

impl ProcessingConfiguration {
    pub fn new(
        search_strategies: Vec<Arc<dyn SearchStrategy>>,
        replacement: Arc<dyn ReplacementStrategy>,
        options: ProcessingOptions,
    ) -> Self {
        let search_strategies = search_strategies
            .into_iter()
            .map(|strategy| matching_case(strategy, &options))
            .collect();
        Self {
            search_strategies,
            replacement,
            options,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProcessingObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Copy of this configuration with `strategy` appended to the search list.
    pub fn with_additional_strategy(&self, strategy: Arc<dyn SearchStrategy>) -> Self {
        let mut config = self.clone();
        config.search_strategies.push(matching_case(strategy, &self.options));
        config
    }

    pub fn search_strategies(&self) -> &[Arc<dyn SearchStrategy>] {
        &self.search_strategies
    }

    pub fn replacement(&self) -> &Arc<dyn ReplacementStrategy> {
        &self.replacement
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn observer(&self) -> Option<&Arc<dyn ProcessingObserver>> {
        self.observer.as_ref()
    }

    pub fn notify(&self, event: &ProcessingEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }
}

/// Folds `strategy` to case-insensitive matching when the options ask for it.
fn matching_case(strategy: Arc<dyn SearchStrategy>, options: &ProcessingOptions) -> Arc<dyn SearchStrategy> {
    if options.case_sensitive {
        return strategy;
    }
    strategy.ignoring_case().unwrap_or(strategy)
}

#[derive(Debug, Clone)]
pub struct TwoPassProcessingConfiguration {
    pub first_pass: ProcessingConfiguration,
    pub second_pass: ProcessingConfiguration,
}

impl TwoPassProcessingConfiguration {
    /// Installs `observer` on both passes.
    pub fn with_observer(self, observer: Arc<dyn ProcessingObserver>) -> Self {
        Self {
            first_pass: self.first_pass.with_observer(observer.clone()),
            second_pass: self.second_pass.with_observer(observer),
        }
    }
}

/// Orchestrator states, logged as the run moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    FirstPass,
    CodeHarvest,
    SecondPass,
    Skip,
    Merged,
    Done,
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub struct TwoPassOrchestrator {
    config: TwoPassProcessingConfiguration,
    chain: HandlerChain,
}

impl TwoPassOrchestrator {
    /// Fails when pass one cannot harvest codes or has nothing to search with.
    pub fn new(config: TwoPassProcessingConfiguration) -> Result<Self> {
        if config.first_pass.search_strategies().is_empty() {
            return Err(ConfigError::NoSearchStrategy("first".into()).into());
        }
        if !config.first_pass.replacement().extracts_codes() {
            return Err(ConfigError::MissingCodeExtraction.into());
        }
        Ok(Self {
            config,
            chain: HandlerChain::standard(),
        })
    }

    pub fn with_chain(mut self, chain: HandlerChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn config(&self) -> &TwoPassProcessingConfiguration {
        &self.config
    }

    /// Runs both passes with a fresh code accumulator.
    pub fn process(&self, document: &mut dyn DocumentAccess) -> ProcessingResult {
        let mut codes = CodeAccumulator::new();
        self.process_with(document, &mut codes)
    }

    /// Runs both passes, harvesting into `codes`. The accumulator is not
    /// cleared here; callers reusing one across documents clear it first.
    #[instrument(skip_all)]
    pub fn process_with(
        &self,
        document: &mut dyn DocumentAccess,
        codes: &mut CodeAccumulator,
    ) -> ProcessingResult {
        let mut state = PassState::Idle;
        debug!(%state, "Starting two-pass run");

        state = PassState::FirstPass;
        debug!(%state);
        let first = &self.config.first_pass;
        first.notify(&ProcessingEvent::PassStarted { pass: "first" });
        let mut merged = match self.chain.run(document, first, codes) {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "First pass failed, second pass not attempted");
                return ProcessingResult::fatal(e.to_string());
            }
        };
        first.notify(&ProcessingEvent::PassCompleted { pass: "first", result: &merged });

        state = PassState::CodeHarvest;
        let harvested = codes.len();
        debug!(%state, codes = harvested);
        first.notify(&ProcessingEvent::CodesHarvested { count: harvested });

        if harvested == 0 {
            state = PassState::Skip;
            debug!(%state, "No organization codes harvested");
        } else {
            state = PassState::SecondPass;
            debug!(%state);
            match self.run_second_pass(document, codes) {
                Ok(Some(second)) => merged.merge(second),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Second pass failed");
                    return ProcessingResult::fatal(e.to_string());
                }
            }
        }

        state = PassState::Merged;
        merged.set_metadata(CODES_REMOVED_KEY, harvested);
        debug!(%state, found = merged.matches_found, processed = merged.matches_processed);

        state = PassState::Done;
        info!(
            %state,
            success = merged.success,
            found = merged.matches_found,
            processed = merged.matches_processed,
            codes = harvested,
            "Two-pass run finished"
        );
        merged
    }

    fn run_second_pass(
        &self,
        document: &mut dyn DocumentAccess,
        codes: &CodeAccumulator,
    ) -> Result<Option<ProcessingResult>> {
        let base = &self.config.second_pass;
        let strategy = match FixedCodeSearchStrategy::new(
            codes.extracted_codes().iter().cloned(),
            base.options().case_sensitive,
        ) {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!(error = %e, "Could not build code search, second pass skipped");
                let mut result = ProcessingResult::new();
                result.add_error(e.to_string());
                return Ok(Some(result));
            }
        };
        let second = base.with_additional_strategy(Arc::new(strategy));

        second.notify(&ProcessingEvent::PassStarted { pass: "second" });
        // Codes found while sweeping must not feed back into the harvest.
        let mut scratch = CodeAccumulator::new();
        let result = self.chain.run(document, &second, &mut scratch)?;
        second.notify(&ProcessingEvent::PassCompleted { pass: "second", result: &result });
        Ok(Some(result))
    }

    /// Runs both passes over a single block of plain text.
    pub fn process_text(&self, text: &str) -> (String, ProcessingResult) {
        let mut document = InMemoryDocument::from_text(text);
        let result = self.process(&mut document);
        (document.area_text(AreaKind::Body), result)
    }
}

/// One pass over a single text block without a document or handler chain.
pub fn anonymize_block(
    text: &str,
    config: &ProcessingConfiguration,
    codes: &mut CodeAccumulator,
) -> (String, ProcessingResult) {
    let (editor, result) = anonymize_fragments(&[text], config, codes, AreaKind::Body.as_str());
    (editor.text(), result)
}
