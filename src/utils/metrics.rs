//! Metrics collection for anonymization runs
//! Author: kartik4091

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;

/// Counter and timer store shared by observers and the batch driver.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<RwLock<BTreeMap<String, u64>>>,
    timers: Arc<RwLock<BTreeMap<String, Duration>>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, value: u64) {
        let mut counters = self.counters.write();
        *counters.entry(name.to_string()).or_insert(0) += value;
    }

    /// Adds `elapsed` to the total of timer `name`.
    pub fn record_duration(&self, name: &str, elapsed: Duration) {
        let mut timers = self.timers.write();
        *timers.entry(name.to_string()).or_default() += elapsed;
    }

    pub fn get_counter(&self, name: &str) -> u64 {
        self.counters.read().get(name).copied().unwrap_or(0)
    }

    pub fn get_timer(&self, name: &str) -> Option<Duration> {
        self.timers.read().get(name).copied()
    }

    pub fn reset(&self) {
        self.counters.write().clear();
        self.timers.write().clear();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.read().clone(),
            timers_ms: self
                .timers
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.as_millis() as u64))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub timers_ms: BTreeMap<String, u64>,
}
