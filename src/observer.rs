//! Observability hook for processing runs
//! Author: kartik4091
//!
//! Handlers report what happened through their returned results. Observers
//! only receive a copy of the events for tracing and metrics; they cannot
//! change a result. Match values are never part of an event.

use std::collections::HashMap;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::types::ProcessingResult;
use crate::utils::metrics::Metrics;

#[derive(Debug, Clone, Copy)]
pub enum ProcessingEvent<'a> {
    PassStarted { pass: &'a str },
    AreaSkipped { area: &'a str },
    MatchReplaced { area: &'a str, match_type: &'a str, start: usize, length: usize },
    ItemWarning { area: &'a str, message: &'a str },
    AreaFailed { area: &'a str, message: &'a str },
    CodesHarvested { count: usize },
    PassCompleted { pass: &'a str, result: &'a ProcessingResult },
}

pub trait ProcessingObserver: Send + Sync + fmt::Debug {
    fn on_event(&self, event: &ProcessingEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProcessingObserver for TracingObserver {
    fn on_event(&self, event: &ProcessingEvent<'_>) {
        match *event {
            ProcessingEvent::PassStarted { pass } => info!(pass, "Pass started"),
            ProcessingEvent::AreaSkipped { area } => debug!(area, "Area disabled, skipped"),
            ProcessingEvent::MatchReplaced { area, match_type, start, length } => {
                debug!(area, match_type, start, length, "Match replaced")
            }
            ProcessingEvent::ItemWarning { area, message } => warn!(area, message, "Item skipped"),
            ProcessingEvent::AreaFailed { area, message } => warn!(area, message, "Area failed"),
            ProcessingEvent::CodesHarvested { count } => info!(count, "Organization codes harvested"),
            ProcessingEvent::PassCompleted { pass, result } => info!(
                pass,
                found = result.matches_found,
                processed = result.matches_processed,
                warnings = result.warnings.len(),
                "Pass completed"
            ),
        }
    }
}

/// Counts events into a [`Metrics`] store.
///
/// One observer may be shared by documents running on several threads. A
/// pass runs start to finish on one thread, so pass timers are keyed by
/// thread until they are folded into the per-pass total.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    metrics: Metrics,
    running: Mutex<HashMap<(String, ThreadId), Instant>>,
}

impl MetricsObserver {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            running: Mutex::default(),
        }
    }

    fn pass_started(&self, pass: &str) {
        let key = (pass.to_string(), thread::current().id());
        self.running.lock().insert(key, Instant::now());
    }

    fn pass_completed(&self, pass: &str) {
        let key = (pass.to_string(), thread::current().id());
        let started = self.running.lock().remove(&key);
        if let Some(started) = started {
            self.metrics.record_duration(pass, started.elapsed());
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl ProcessingObserver for MetricsObserver {
    fn on_event(&self, event: &ProcessingEvent<'_>) {
        match *event {
            ProcessingEvent::PassStarted { pass } => self.pass_started(pass),
            ProcessingEvent::AreaSkipped { .. } => self.metrics.increment_counter("areas.skipped"),
            ProcessingEvent::MatchReplaced { match_type, .. } => {
                self.metrics.increment_counter("matches.replaced");
                self.metrics.increment_counter(&format!("matches.{match_type}"));
            }
            ProcessingEvent::ItemWarning { .. } => self.metrics.increment_counter("items.warned"),
            ProcessingEvent::AreaFailed { .. } => self.metrics.increment_counter("areas.failed"),
            ProcessingEvent::CodesHarvested { count } => {
                self.metrics.add_to_counter("codes.harvested", count as u64)
            }
            ProcessingEvent::PassCompleted { pass, .. } => self.pass_completed(pass),
        }
    }
}

/// Sends every event to several observers.
#[derive(Debug, Default)]
pub struct ObserverSet {
    observers: Vec<std::sync::Arc<dyn ProcessingObserver>>,
}

impl ObserverSet {
    pub fn new(observers: Vec<std::sync::Arc<dyn ProcessingObserver>>) -> Self {
        Self { observers }
    }
}

impl ProcessingObserver for ObserverSet {
    fn on_event(&self, event: &ProcessingEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
