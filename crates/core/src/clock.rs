//! Wall-clock time source
//!
//! Every timestamp the collector writes into an ad (`LastHeardFrom`,
//! `LastForwarded`) and every staleness check reads whole seconds since the
//! Unix epoch from a [`Clock`]. Production code uses [`SystemClock`]; tests
//! drive time explicitly with [`ManualClock`].

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of wall-clock seconds since the Unix epoch
pub trait Clock: Send + Sync + Debug {
    /// Current time in whole seconds
    fn now(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to
///
/// ```
/// use adcollector_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(15);
/// assert_eq!(clock.now(), 1_015);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading `start`
    pub fn new(start: i64) -> Self {
        Self {
            secs: AtomicI64::new(start),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Move forward by `secs`
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}
