//! Builder for fluent engine construction

use adcollector_core::{Clock, Result, SystemClock};
use adcollector_storage::{AdTables, NoOfflineHook, OfflineHook, PeriodicTimer};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicI64, AtomicU64};
use std::sync::Arc;

use super::CollectorEngine;
use crate::admission::AdmissionPolicy;
use crate::config::CollectorConfig;
use crate::forward::ForwardFilter;
use crate::stats::{NullStats, StatsSink};

/// Builder for [`CollectorEngine`]
///
/// Every collaborator has a default: no statistics, no offline veto, and the
/// system clock.
///
/// ```
/// use std::sync::Arc;
/// use adcollector_core::ManualClock;
/// use adcollector_engine::{CollectorConfig, CollectorEngine};
///
/// let engine = CollectorEngine::builder()
///     .config(CollectorConfig { allow_only_one_negotiator: true, ..Default::default() })
///     .clock(Arc::new(ManualClock::new(1_000)))
///     .build()
///     .unwrap();
/// assert_eq!(engine.update_interval_secs(), 900);
/// ```
pub struct CollectorEngineBuilder {
    config: CollectorConfig,
    stats: Arc<dyn StatsSink>,
    offline_hook: Arc<dyn OfflineHook>,
    clock: Arc<dyn Clock>,
}

impl Default for CollectorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorEngineBuilder {
    /// Create a builder with default configuration and collaborators
    pub fn new() -> Self {
        Self {
            config: CollectorConfig::default(),
            stats: Arc::new(NullStats),
            offline_hook: Arc::new(NoOfflineHook),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `config`
    pub fn config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Report updates to `stats`
    pub fn stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = stats;
        self
    }

    /// Consult `hook` before evicting stale ads
    pub fn offline_hook(mut self, hook: Arc<dyn OfflineHook>) -> Self {
        self.offline_hook = hook;
        self
    }

    /// Read time from `clock`
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and build the engine
    ///
    /// The housekeeper is not started; see
    /// [`CollectorEngine::start_housekeeper`].
    pub fn build(self) -> Result<CollectorEngine> {
        self.config.validate()?;
        let config = self.config;
        let admission = AdmissionPolicy::new(config.requirements_expr()?);
        // Intervals are bounded by validate(), so they fit in an i64.
        let forward = ForwardFilter::new(
            config.forward_filtering,
            config.forward_interval_secs() as i64,
            config.forward_watch_list.clone(),
        );

        Ok(CollectorEngine {
            update_interval_secs: AtomicI64::new(config.update_interval_secs as i64),
            client_timeout_secs: AtomicU64::new(config.client_timeout_secs),
            tables: AdTables::new(),
            admission: RwLock::new(admission),
            forward: RwLock::new(forward),
            self_ad: Mutex::new(None),
            housekeeper: PeriodicTimer::new("adcollector-housekeeper"),
            stats: self.stats,
            offline_hook: self.offline_hook,
            clock: self.clock,
            config,
        })
    }
}
