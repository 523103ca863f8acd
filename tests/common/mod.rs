//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::HashSet;
use std::sync::{Arc, Once};

use parking_lot::Mutex;

pub use adcollector::{
    attrs, Ad, AdKey, AdKind, AdType, CollectOutcome, CollectResult, CollectorConfig,
    CollectorEngine, Command, ManualClock, OfflineHook, QueuedSource, UpdateCounters, WalkScope,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route engine warnings to the test writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// Wall-clock start for every test collector.
pub const T0: i64 = 1_700_000_000;

// ============================================================================
// Collaborator doubles
// ============================================================================

/// Offline hook that records every ad it sees and vetoes chosen names.
#[derive(Default)]
pub struct RecordingHook {
    seen: Mutex<Vec<String>>,
    veto: Mutex<HashSet<String>>,
}

impl RecordingHook {
    pub fn veto(&self, name: &str) {
        self.veto.lock().insert(name.to_string());
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl OfflineHook for RecordingHook {
    fn expire(&self, ad: &Ad) -> bool {
        let name = ad.lookup_string(attrs::NAME).unwrap_or_default();
        self.seen.lock().push(name.clone());
        self.veto.lock().contains(&name)
    }
}

// ============================================================================
// Test collector
// ============================================================================

/// Engine wired to a manual clock, counting stats and a recording hook.
pub struct TestCollector {
    pub engine: Arc<CollectorEngine>,
    pub clock: Arc<ManualClock>,
    pub stats: Arc<UpdateCounters>,
    pub hook: Arc<RecordingHook>,
}

impl TestCollector {
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    pub fn with_config(config: CollectorConfig) -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(T0));
        let stats = Arc::new(UpdateCounters::new());
        let hook = Arc::new(RecordingHook::default());
        let engine = CollectorEngine::builder()
            .config(config)
            .clock(clock.clone())
            .stats(stats.clone())
            .offline_hook(hook.clone())
            .build()
            .expect("test config is valid");
        Self {
            engine: Arc::new(engine),
            clock,
            stats,
            hook,
        }
    }

    pub fn collect(&self, command: Command, ad: Ad) -> CollectResult {
        self.engine.collect(command, ad, None)
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(secs);
    }
}

// ============================================================================
// Ad builders
// ============================================================================

pub fn startd(name: &str, host: &str) -> Ad {
    let mut ad = Ad::with_type("Machine");
    ad.insert("Name", name);
    ad.insert("MyAddress", format!("<{}:9618>", host));
    ad.insert("State", "Unclaimed");
    ad.insert("Cpus", 8);
    ad
}

pub fn schedd(name: &str, host: &str) -> Ad {
    let mut ad = Ad::with_type("Scheduler");
    ad.insert("Name", name);
    ad.insert("MyAddress", format!("<{}:9618>", host));
    ad
}

pub fn named(my_type: &str, name: &str) -> Ad {
    let mut ad = Ad::with_type(my_type);
    ad.insert("Name", name);
    ad
}

/// Minimal ad with a derivable key for every built-in update command.
pub fn keyed_ad_for(command: Command) -> Ad {
    let mut ad = named("Any", "daemon@host1");
    ad.insert("MyAddress", "<10.2.3.4:9618>");
    ad.insert("Machine", "host1");
    match command {
        Command::UpdateAccounting => {
            ad.insert("NegotiatorName", "neg");
        }
        Command::UpdateGrid => {
            ad.insert("HashName", "gt2 host1");
            ad.insert("ScheddName", "schedd@host1");
            ad.insert("Owner", "alice");
        }
        Command::UpdateGeneric => ad.set_my_type("Widget"),
        _ => {}
    }
    ad
}

/// Every update command the engine applies, merge excluded.
pub const UPDATE_COMMANDS: [Command; 16] = [
    Command::UpdateStartd,
    Command::UpdateStartdWithAck,
    Command::UpdateSchedd,
    Command::UpdateSubmittor,
    Command::UpdateLicense,
    Command::UpdateMaster,
    Command::UpdateCkptServer,
    Command::UpdateCollector,
    Command::UpdateStorage,
    Command::UpdateAccounting,
    Command::UpdateNegotiator,
    Command::UpdateHad,
    Command::UpdateGrid,
    Command::UpdateGeneric,
    Command::UpdateXferService,
    Command::UpdateLeaseManager,
];
