//! TTL eviction of stale ads
//!
//! An ad is stale once `now - LastHeardFrom` exceeds its lifetime: the ad's
//! own `ClassAdLifetime` when it carries one, the collector-wide default
//! otherwise. `LastHeardFrom == 0` marks an ad that was explicitly
//! invalidated; it is evicted on the next sweep regardless of lifetime.
//!
//! Before an ad is dropped the [`OfflineHook`] may veto the removal. A
//! vetoed ad stays in its registry and the sweep moves on.

use adcollector_core::{attrs, Ad, AdKey, Clock};
use std::fmt;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::registry::SharedRegistry;

/// Gets the last word before a stale ad is dropped
pub trait OfflineHook: Send + Sync {
    /// Return true to keep `ad` in its registry
    ///
    /// An implementation that vetoes is expected to have recorded the ad as
    /// absent somewhere outside the collector.
    fn expire(&self, ad: &Ad) -> bool;
}

/// Hook that never vetoes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOfflineHook;

impl OfflineHook for NoOfflineHook {
    fn expire(&self, _ad: &Ad) -> bool {
        false
    }
}

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Ads looked at
    pub examined: usize,
    /// Stale ads removed
    pub evicted: usize,
    /// Invalidated ads removed (`LastHeardFrom == 0`)
    pub invalidated: usize,
    /// Stale or invalidated ads the offline hook kept
    pub vetoed: usize,
    /// Ads without a usable `LastHeardFrom`
    pub skipped: usize,
}

impl SweepReport {
    /// Ads removed for any reason
    pub fn removed(&self) -> usize {
        self.evicted + self.invalidated
    }
}

impl AddAssign for SweepReport {
    fn add_assign(&mut self, other: Self) {
        self.examined += other.examined;
        self.evicted += other.evicted;
        self.invalidated += other.invalidated;
        self.vetoed += other.vetoed;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined={} evicted={} invalidated={} vetoed={} skipped={}",
            self.examined, self.evicted, self.invalidated, self.vetoed, self.skipped
        )
    }
}

enum Verdict {
    Fresh,
    Stale,
    Invalidated,
    NoTimestamp,
}

/// Applies TTL eviction to registries
pub struct ExpirationSweeper {
    default_lifetime_secs: i64,
    hook: Arc<dyn OfflineHook>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ExpirationSweeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpirationSweeper")
            .field("default_lifetime_secs", &self.default_lifetime_secs)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ExpirationSweeper {
    /// Create a sweeper
    ///
    /// # Arguments
    ///
    /// * `default_lifetime_secs` - lifetime of ads without `ClassAdLifetime`
    /// * `hook` - veto hook consulted before every removal
    /// * `clock` - time source for staleness checks
    pub fn new(
        default_lifetime_secs: i64,
        hook: Arc<dyn OfflineHook>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            default_lifetime_secs,
            hook,
            clock,
        }
    }

    /// Lifetime applied to ads without `ClassAdLifetime`
    pub fn default_lifetime_secs(&self) -> i64 {
        self.default_lifetime_secs
    }

    /// The veto hook
    pub fn hook(&self) -> &Arc<dyn OfflineHook> {
        &self.hook
    }

    fn verdict(&self, ad: &Ad, now: i64) -> Verdict {
        let Some(last_heard) = ad.lookup_integer(attrs::LAST_HEARD_FROM) else {
            return Verdict::NoTimestamp;
        };
        if last_heard == 0 {
            return Verdict::Invalidated;
        }
        let lifetime = ad
            .lookup_integer(attrs::CLASSAD_LIFETIME)
            .unwrap_or(self.default_lifetime_secs);
        // A timestamp too far in the past to subtract from `now` is stale.
        match now.checked_sub(last_heard) {
            Some(age) if age <= lifetime => Verdict::Fresh,
            _ => Verdict::Stale,
        }
    }

    /// Sweep one registry under its write lock
    pub fn sweep_registry(&self, registry: &SharedRegistry) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();
        let mut guard = registry.write();
        let label = guard.kind().label().to_string();

        let mut doomed: Vec<(AdKey, bool)> = Vec::new();
        for (key, ad) in guard.iter() {
            report.examined += 1;
            let invalidated = match self.verdict(ad, now) {
                Verdict::Fresh => continue,
                Verdict::NoTimestamp => {
                    warn!(
                        target: "adcollector::housekeeper",
                        ad_type = %label,
                        key = %key,
                        "ad has no LastHeardFrom, skipping"
                    );
                    report.skipped += 1;
                    continue;
                }
                Verdict::Invalidated => true,
                Verdict::Stale => false,
            };
            if self.hook.expire(ad) {
                debug!(
                    target: "adcollector::housekeeper",
                    ad_type = %label,
                    key = %key,
                    "offline hook kept stale ad"
                );
                report.vetoed += 1;
                continue;
            }
            doomed.push((key.clone(), invalidated));
        }

        for (key, invalidated) in doomed {
            if guard.remove(&key).is_none() {
                continue;
            }
            if invalidated {
                info!(
                    target: "adcollector::housekeeper",
                    ad_type = %label,
                    key = %key,
                    "removing invalidated ad"
                );
                report.invalidated += 1;
            } else {
                info!(
                    target: "adcollector::housekeeper",
                    ad_type = %label,
                    key = %key,
                    "removing stale ad"
                );
                report.evicted += 1;
            }
        }
        report
    }

    /// Sweep several registries, one lock at a time
    pub fn sweep<'a, I>(&self, registries: I) -> SweepReport
    where
        I: IntoIterator<Item = &'a SharedRegistry>,
    {
        let mut total = SweepReport::default();
        for registry in registries {
            total += self.sweep_registry(registry);
        }
        total
    }
}
