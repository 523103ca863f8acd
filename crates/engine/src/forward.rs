//! Forwarding filter for downstream replicas
//!
//! When filtering is enabled, every startd, private startd and submitter
//! update is stamped with `ShouldForward` so the forwarding layer can skip
//! updates that carry nothing new. An update is forwarded when the previous
//! forward is older than the forward interval, or when any watched attribute
//! has a defined value in both the old and the new ad and the values differ.

use adcollector_core::{attrs, Ad, AdKind};

/// Outcome of the forwarding test for one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardDecision {
    /// Whether the update should be forwarded
    pub forward: bool,
    /// Value to store as `LastForwarded`
    pub last_forwarded: i64,
}

/// Forwarding settings
#[derive(Debug, Clone)]
pub struct ForwardFilter {
    enabled: bool,
    interval_secs: i64,
    watch_list: Vec<String>,
}

impl ForwardFilter {
    /// Create a filter
    pub fn new(enabled: bool, interval_secs: i64, watch_list: Vec<String>) -> Self {
        Self {
            enabled,
            interval_secs,
            watch_list,
        }
    }

    /// Whether filtering is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forced-forward interval in seconds
    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    /// Change the forced-forward interval
    pub fn set_interval_secs(&mut self, secs: i64) {
        self.interval_secs = secs;
    }

    /// Watched attribute names
    pub fn watch_list(&self) -> &[String] {
        &self.watch_list
    }

    /// Whether updates to `kind` go through this filter
    pub fn applies_to(&self, kind: &AdKind) -> bool {
        self.enabled
            && kind
                .as_builtin()
                .map_or(false, |t| t.is_forward_filtered())
    }

    /// Decide whether replacing `old` with `new` at `now` is forwarded
    pub fn decide(&self, old: &Ad, new: &Ad, now: i64) -> ForwardDecision {
        let previous = old.lookup_integer(attrs::LAST_FORWARDED).unwrap_or(0);
        let forward =
            now.saturating_sub(previous) > self.interval_secs || self.watched_change(old, new);
        ForwardDecision {
            forward,
            last_forwarded: if forward { now } else { previous },
        }
    }

    fn watched_change(&self, old: &Ad, new: &Ad) -> bool {
        self.watch_list.iter().any(|attr| {
            match (old.evaluate_attr(attr), new.evaluate_attr(attr)) {
                (Some(before), Some(after)) => {
                    !before.is_undefined() && !after.is_undefined() && !after.same_as(&before)
                }
                _ => false,
            }
        })
    }

    /// Stamp a freshly inserted ad
    pub fn stamp_insert(&self, ad: &mut Ad, now: i64) {
        ad.insert(attrs::LAST_FORWARDED, now);
    }

    /// Stamp `new`, which is about to replace `old`
    pub fn stamp_update(&self, old: &Ad, new: &mut Ad, now: i64) -> ForwardDecision {
        let decision = self.decide(old, new, now);
        new.insert(attrs::SHOULD_FORWARD, decision.forward);
        new.insert(attrs::LAST_FORWARDED, decision.last_forwarded);
        decision
    }
}
