//! Periodic eviction of stale ads

use adcollector_core::{Result, WalkScope};
use adcollector_storage::{ExpirationSweeper, SweepReport};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::CollectorEngine;

impl CollectorEngine {
    fn sweeper(&self) -> ExpirationSweeper {
        ExpirationSweeper::new(
            self.update_interval_secs(),
            Arc::clone(&self.offline_hook),
            Arc::clone(&self.clock),
        )
    }

    /// Sweep every registry once, private and generic ones included
    pub fn housekeep(&self) -> SweepReport {
        let started = Instant::now();
        let report = self.sweeper().sweep(&self.tables.all());
        info!(
            target: "adcollector::housekeeper",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "housekeeping done: {}",
            report
        );
        report
    }

    /// Sweep the registries in `scope` now
    ///
    /// [`WalkScope::Any`] sweeps everything, as [`housekeep`](Self::housekeep)
    /// does.
    pub fn invoke_housekeeper(&self, scope: &WalkScope) -> SweepReport {
        let registries = match scope {
            WalkScope::Any => self.tables.all(),
            other => self.tables.in_scope(other),
        };
        let report = self.sweeper().sweep(&registries);
        debug!(target: "adcollector::housekeeper", scope = ?scope, "on-demand sweep: {}", report);
        report
    }

    /// Arm the housekeeper at the configured update interval
    pub fn start_housekeeper(self: &Arc<Self>) -> Result<bool> {
        self.schedule_housekeeper(self.config.update_interval_secs as i64)
    }

    /// Re-arm the housekeeper with a new period
    ///
    /// The period also becomes the default ad lifetime. Unless a forward
    /// interval is configured explicitly it is reset to a third of the
    /// period. A non-positive period only cancels the running timer and
    /// returns `false`.
    ///
    /// The timer holds a weak reference; dropping the last `Arc` stops it.
    pub fn schedule_housekeeper(self: &Arc<Self>, period_secs: i64) -> Result<bool> {
        if period_secs <= 0 {
            self.housekeeper.cancel();
            debug!(target: "adcollector::housekeeper", period_secs, "housekeeper disabled");
            return Ok(false);
        }

        self.update_interval_secs.store(period_secs, Ordering::SeqCst);
        let forward_interval = self
            .config
            .forward_interval_secs
            .map(|secs| secs as i64)
            .unwrap_or(period_secs / 3);
        self.forward.write().set_interval_secs(forward_interval);

        let engine: Weak<Self> = Arc::downgrade(self);
        self.housekeeper
            .schedule(Duration::from_secs(period_secs as u64), move || {
                if let Some(engine) = engine.upgrade() {
                    engine.housekeep();
                }
            })?;
        info!(
            target: "adcollector::housekeeper",
            period_secs,
            forward_interval_secs = forward_interval,
            "housekeeper scheduled"
        );
        Ok(true)
    }

    /// Stop the housekeeper
    pub fn cancel_housekeeper(&self) {
        self.housekeeper.cancel();
    }

    /// Whether the housekeeper is armed
    pub fn housekeeper_armed(&self) -> bool {
        self.housekeeper.is_armed()
    }

    /// Housekeeper threads currently alive; never more than one
    pub fn housekeeper_threads(&self) -> usize {
        self.housekeeper.live_threads()
    }
}
