//! adcollector - soft-state ad registry for a cluster collector daemon
//!
//! Cluster daemons push self-describing attribute records ("ads") at a
//! fixed cadence. The collector keeps the latest ad per daemon in typed
//! registries, evicts ads whose senders go quiet, and answers lookups.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use adcollector::{Ad, AdType, CollectOutcome, CollectorEngine, Command};
//!
//! let engine = Arc::new(CollectorEngine::builder().build()?);
//! engine.start_housekeeper()?;
//!
//! let mut ad = Ad::with_type("Machine");
//! ad.insert("Name", "slot1@node7");
//! ad.insert("MyAddress", "<10.0.0.7:9618>");
//! let result = engine.collect(Command::UpdateStartd, ad, None);
//! assert_eq!(result.outcome, CollectOutcome::Inserted);
//! assert_eq!(engine.len(&AdType::Startd.into()), 1);
//!
//! engine.cancel_housekeeper();
//! # Ok::<(), adcollector::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `adcollector-core`: ads, the expression language, ad types, keys
//! - `adcollector-storage`: registries, the generic directory, expiration
//! - `adcollector-engine`: the collector engine and its collaborators

pub use adcollector_core::*;
pub use adcollector_engine::*;
pub use adcollector_storage::{
    AdRegistry, AdTables, ExpirationSweeper, NoOfflineHook, OfflineHook, SweepReport,
};
