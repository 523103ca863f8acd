//! Registry storage for the ad collector
//!
//! This crate holds the soft state of a collector:
//! - AdRegistry: key → ad mapping for one ad type, shared behind a RwLock
//! - GenericTypeDirectory: lazily created registries for run-time types
//! - AdTables: every built-in registry plus the generic directory
//! - ExpirationSweeper: TTL eviction with an offline veto hook
//! - PeriodicTimer: the single replaceable housekeeping thread

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod registry;
pub mod sweeper;
pub mod tables;
pub mod timer;

pub use directory::GenericTypeDirectory;
pub use registry::{AdRegistry, SharedRegistry};
pub use sweeper::{ExpirationSweeper, NoOfflineHook, OfflineHook, SweepReport};
pub use tables::AdTables;
pub use timer::PeriodicTimer;
