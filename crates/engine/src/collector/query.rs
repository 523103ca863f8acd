//! Lookup, removal and iteration over stored ads

use adcollector_core::{attrs, Ad, AdKey, AdKind, EvalValue, WalkScope};
use tracing::{debug, info};

use super::CollectorEngine;

impl CollectorEngine {
    /// Copy of the ad stored under `key`
    pub fn lookup(&self, kind: &AdKind, key: &AdKey) -> Option<Ad> {
        let registry = self.tables.find(kind)?;
        let guard = registry.read();
        guard.get(key).cloned()
    }

    /// Remove the ad stored under `key`; returns whether one was there
    pub fn remove_by_key(&self, kind: &AdKind, key: &AdKey) -> bool {
        let Some(registry) = self.tables.find(kind) else {
            return false;
        };
        let removed = registry.write().remove(key).is_some();
        if removed {
            info!(target: "adcollector::engine", ad_type = %kind, key = %key, "removed ad");
        }
        removed
    }

    /// Remove the ad whose key is derived from the partial ad `query`
    ///
    /// Returns the number of ads removed and whether a key could be derived
    /// at all. A caller that gets `false` back typically falls back to a
    /// constraint-based removal of its own.
    pub fn remove_by_query(&self, kind: &AdKind, query: &Ad) -> (usize, bool) {
        match AdKey::derive(kind, query) {
            Ok(key) => (usize::from(self.remove_by_key(kind, &key)), true),
            Err(_) => (0, false),
        }
    }

    /// Mark the ad matching `query` as expired
    ///
    /// The ad is stamped with `LastHeardFrom = 1` and handed to the offline
    /// hook. It is removed unless the hook vetoes, in which case it stays
    /// with the new stamp. Returns the number removed and whether a key
    /// could be derived.
    pub fn expire_by_query(&self, kind: &AdKind, query: &Ad) -> (usize, bool) {
        let Ok(key) = AdKey::derive(kind, query) else {
            return (0, false);
        };
        let Some(registry) = self.tables.find(kind) else {
            return (0, true);
        };

        let mut guard = registry.write();
        let Some(ad) = guard.get_mut(&key) else {
            return (0, true);
        };
        ad.insert(attrs::LAST_HEARD_FROM, 1);
        if self.offline_hook.expire(ad) {
            debug!(target: "adcollector::engine", ad_type = %kind, key = %key, "offline hook kept expired ad");
            return (0, true);
        }
        guard.remove(&key);
        info!(target: "adcollector::engine", ad_type = %kind, key = %key, "expired ad");
        (1, true)
    }

    /// Remove every ad of `kind` that `query` half-matches
    ///
    /// An ad half-matches when the query's `TargetType`, unless absent or
    /// `Any`, equals the ad's `MyType` ignoring case, and the query's
    /// `Requirements`, if present, evaluates to true with the ad as
    /// `TARGET`.
    pub fn invalidate_matching(&self, kind: &AdKind, query: &Ad) -> usize {
        let Some(registry) = self.tables.find(kind) else {
            return 0;
        };
        let mut guard = registry.write();
        let doomed: Vec<AdKey> = guard
            .iter()
            .filter(|(_, ad)| half_matches(query, ad))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            guard.remove(key);
            info!(target: "adcollector::engine", ad_type = %kind, key = %key, "invalidated ad");
        }
        doomed.len()
    }

    /// Apply `predicate` to every ad in `scope`
    ///
    /// Every ad is visited even after a rejection; the result is false if
    /// any call returned false.
    pub fn walk<F>(&self, scope: &WalkScope, predicate: F) -> bool
    where
        F: FnMut(&Ad) -> bool,
    {
        self.tables.walk(scope, predicate)
    }

    /// Number of ads of `kind`
    pub fn len(&self, kind: &AdKind) -> usize {
        self.tables.len(kind)
    }

    /// Number of ads in every registry
    pub fn total_len(&self) -> usize {
        self.tables.total_len()
    }

    /// Generic type names seen so far, sorted
    pub fn generic_type_names(&self) -> Vec<String> {
        self.tables.generic().names()
    }

    // =========================================================================
    // Self ad
    // =========================================================================

    /// Remember which stored ad describes this collector
    ///
    /// Only the location is kept. The ad itself stays owned by its registry
    /// and may be replaced or evicted like any other.
    pub fn identify_self_ad(&self, kind: AdKind, key: AdKey) {
        *self.self_ad.lock() = Some((kind, key));
    }

    /// Current copy of this collector's own ad, if it is still stored
    pub fn self_ad(&self) -> Option<Ad> {
        let location = self.self_ad.lock().clone()?;
        self.lookup(&location.0, &location.1)
    }
}

fn half_matches(query: &Ad, candidate: &Ad) -> bool {
    if let Some(target_type) = query.lookup_string(attrs::TARGET_TYPE) {
        if !target_type.eq_ignore_ascii_case("any") {
            let my_type = candidate.my_type().unwrap_or_default();
            if !target_type.eq_ignore_ascii_case(&my_type) {
                return false;
            }
        }
    }
    match query.evaluate_attr_against(attrs::REQUIREMENTS, candidate) {
        None => true,
        Some(value) => value == EvalValue::Bool(true),
    }
}
