//! Per-type ad registry
//!
//! An `AdRegistry` maps [`AdKey`] to an owned [`Ad`]. Keys are unique; storing
//! under an existing key replaces the previous ad and hands it back to the
//! caller. Registries are shared as [`SharedRegistry`], and callers hold the
//! write lock for the whole of a read-modify-write so that no other thread
//! observes a registry mid-update.
//!
//! ## Usage
//!
//! ```
//! use adcollector_core::{Ad, AdKey, AdType};
//! use adcollector_storage::AdRegistry;
//!
//! let registry = AdRegistry::shared(AdType::Master.into());
//! registry.write().insert(AdKey::new("node7", ""), Ad::with_type("DaemonMaster"));
//! assert_eq!(registry.read().len(), 1);
//! ```

use adcollector_core::{Ad, AdKey, AdKind};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Registry behind its own lock
pub type SharedRegistry = Arc<RwLock<AdRegistry>>;

/// Mapping from key to ad for a single ad type
#[derive(Debug)]
pub struct AdRegistry {
    kind: AdKind,
    ads: FxHashMap<AdKey, Ad>,
}

impl AdRegistry {
    /// Create an empty registry
    pub fn new(kind: AdKind) -> Self {
        Self {
            kind,
            ads: FxHashMap::default(),
        }
    }

    /// Create an empty registry already wrapped for sharing
    pub fn shared(kind: AdKind) -> SharedRegistry {
        Arc::new(RwLock::new(Self::new(kind)))
    }

    /// Type of ad this registry holds
    pub fn kind(&self) -> &AdKind {
        &self.kind
    }

    /// Number of stored ads
    pub fn len(&self) -> usize {
        self.ads.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    /// Get the ad stored under `key`
    pub fn get(&self, key: &AdKey) -> Option<&Ad> {
        self.ads.get(key)
    }

    /// Get the ad stored under `key` for in-place modification
    pub fn get_mut(&mut self, key: &AdKey) -> Option<&mut Ad> {
        self.ads.get_mut(key)
    }

    /// Check whether `key` is present
    pub fn contains(&self, key: &AdKey) -> bool {
        self.ads.contains_key(key)
    }

    /// Store `ad` under `key`, returning the ad it replaced
    pub fn insert(&mut self, key: AdKey, ad: Ad) -> Option<Ad> {
        self.ads.insert(key, ad)
    }

    /// Remove and return the ad stored under `key`
    pub fn remove(&mut self, key: &AdKey) -> Option<Ad> {
        self.ads.remove(key)
    }

    /// Drop every ad, returning how many were held
    pub fn purge(&mut self) -> usize {
        let count = self.ads.len();
        self.ads.clear();
        count
    }

    /// Iterate over stored entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&AdKey, &Ad)> {
        self.ads.iter()
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<AdKey> {
        let mut keys: Vec<AdKey> = self.ads.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Apply `predicate` to every ad
    ///
    /// Every entry is visited even after the predicate returns false.
    /// Returns false if any call returned false.
    pub fn walk<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Ad) -> bool,
    {
        let mut all_accepted = true;
        for ad in self.ads.values() {
            if !predicate(ad) {
                all_accepted = false;
            }
        }
        all_accepted
    }
}
