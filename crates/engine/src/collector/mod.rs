//! The collector engine
//!
//! `CollectorEngine` owns every registry and applies inbound ads to them.
//! It is `Send + Sync`; all methods take `&self` and may be called from any
//! number of threads. Each registry is locked for the whole of an update, so
//! replace, merge and singleton purge-then-insert are atomic per registry.
//!
//! ```
//! use adcollector_core::{Ad, AdKey, AdType, Command};
//! use adcollector_engine::{CollectOutcome, CollectorEngine};
//!
//! let engine = CollectorEngine::builder().build().unwrap();
//!
//! let mut ad = Ad::with_type("DaemonMaster");
//! ad.insert("Name", "master@node7");
//! let result = engine.collect(Command::UpdateMaster, ad, None);
//! assert_eq!(result.outcome, CollectOutcome::Inserted);
//!
//! let key = AdKey::new("master@node7", "");
//! assert!(engine.lookup(&AdType::Master.into(), &key).is_some());
//! ```

mod builder;
mod housekeeping;
mod query;
mod update;

pub use builder::CollectorEngineBuilder;

use adcollector_core::{AdKey, AdKind, Clock};
use adcollector_storage::{AdTables, OfflineHook, PeriodicTimer};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::admission::AdmissionPolicy;
use crate::config::CollectorConfig;
use crate::forward::ForwardFilter;
use crate::stats::StatsSink;

/// Central ad registry of a collector daemon
pub struct CollectorEngine {
    config: CollectorConfig,
    tables: AdTables,
    admission: RwLock<AdmissionPolicy>,
    forward: RwLock<ForwardFilter>,
    update_interval_secs: AtomicI64,
    client_timeout_secs: AtomicU64,
    self_ad: Mutex<Option<(AdKind, AdKey)>>,
    housekeeper: PeriodicTimer,
    stats: Arc<dyn StatsSink>,
    offline_hook: Arc<dyn OfflineHook>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CollectorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorEngine")
            .field("config", &self.config)
            .field("ads", &self.tables.total_len())
            .field("update_interval_secs", &self.update_interval_secs())
            .field("housekeeper_armed", &self.housekeeper.is_armed())
            .finish_non_exhaustive()
    }
}

impl CollectorEngine {
    /// Start configuring an engine
    pub fn builder() -> CollectorEngineBuilder {
        CollectorEngineBuilder::new()
    }

    /// Configuration the engine was built from
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The registries
    pub fn tables(&self) -> &AdTables {
        &self.tables
    }

    /// Replace the admission expression
    ///
    /// `None` removes it. On a parse error the engine is left admitting
    /// every ad and the error is returned.
    pub fn set_collector_requirements(&self, text: Option<&str>) -> adcollector_core::Result<()> {
        self.admission.write().set_requirements(text)
    }

    /// Set the overall peer timeout; non-positive values are refused
    pub fn set_client_timeout(&self, secs: i64) -> bool {
        if secs <= 0 {
            return false;
        }
        self.client_timeout_secs.store(secs as u64, Ordering::SeqCst);
        true
    }

    /// Overall peer timeout
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs.load(Ordering::SeqCst))
    }

    /// Default ad lifetime and housekeeping period, in seconds
    pub fn update_interval_secs(&self) -> i64 {
        self.update_interval_secs.load(Ordering::SeqCst)
    }

    /// Forced-forward interval currently in effect
    pub fn forward_interval_secs(&self) -> i64 {
        self.forward.read().interval_secs()
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now()
    }
}
