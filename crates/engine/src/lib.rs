//! Collector engine for adcollector
//!
//! This crate ties the lower layers together:
//! - CollectorEngine: admission, key derivation and update of inbound ads
//! - Merge and singleton handling for startd and negotiator ads
//! - Forwarding decisions for downstream collectors
//! - Housekeeping: timed and on-demand eviction of stale ads
//! - Configuration loaded from TOML
//!
//! Transport, statistics and offline persistence stay outside; the engine
//! reaches them through the [`AdSource`], [`StatsSink`] and
//! [`OfflineHook`](adcollector_storage::OfflineHook) traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admission;
pub mod collector;
pub mod config;
pub mod forward;
pub mod outcome;
pub mod stats;
pub mod transport;

pub use admission::{AdmissionPolicy, Rejection};
pub use collector::{CollectorEngine, CollectorEngineBuilder};
pub use config::{CollectorConfig, CONFIG_FILE_NAME, MAX_INTERVAL_SECS};
pub use forward::{ForwardDecision, ForwardFilter};
pub use outcome::{CollectOutcome, CollectResult};
pub use stats::{LabelCounts, NullStats, StatsSink, UpdateCounters};
pub use transport::{AdSource, PeerIdentity, QueuedSource};
