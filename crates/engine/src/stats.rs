//! Update statistics collaborator
//!
//! The engine reports every insert and replacement (never merges, never
//! private ads) to a [`StatsSink`]. Aggregation is the sink's business.

use adcollector_core::Ad;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Receives one call per stored update
pub trait StatsSink: Send + Sync {
    /// `old` is `None` for an insert
    fn record(&self, label: &str, old: Option<&Ad>, new: &Ad);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStats;

impl StatsSink for NullStats {
    fn record(&self, _label: &str, _old: Option<&Ad>, _new: &Ad) {}
}

/// Insert and update totals for one label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    /// First sightings
    pub inserts: u64,
    /// Replacements of an existing ad
    pub updates: u64,
}

/// Per-label update counters
#[derive(Debug, Default)]
pub struct UpdateCounters {
    counts: Mutex<BTreeMap<String, LabelCounts>>,
}

impl UpdateCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for `label`
    pub fn get(&self, label: &str) -> LabelCounts {
        self.counts.lock().get(label).copied().unwrap_or_default()
    }

    /// Snapshot of every label seen, sorted
    pub fn snapshot(&self) -> Vec<(String, LabelCounts)> {
        self.counts
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

impl StatsSink for UpdateCounters {
    fn record(&self, label: &str, old: Option<&Ad>, _new: &Ad) {
        let mut counts = self.counts.lock();
        let entry = counts.entry(label.to_string()).or_default();
        if old.is_some() {
            entry.updates += 1;
        } else {
            entry.inserts += 1;
        }
    }
}
