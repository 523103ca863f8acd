//! Registries for ad types discovered at run time
//!
//! A generic update names its type through the ad's `MyType`. The first ad
//! of a new type creates its registry; every later ad of that type reuses
//! it. Registries are never dropped once created.

use adcollector_core::AdKind;
use dashmap::DashMap;
use tracing::info;

use crate::registry::{AdRegistry, SharedRegistry};

/// Name-indexed set of generic registries
#[derive(Debug, Default)]
pub struct GenericTypeDirectory {
    tables: DashMap<String, SharedRegistry>,
}

impl GenericTypeDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `type_name`, if one has been created
    pub fn find(&self, type_name: &str) -> Option<SharedRegistry> {
        self.tables.get(type_name).map(|entry| entry.value().clone())
    }

    /// Registry for `type_name`, creating it on first use
    ///
    /// The name comes from the sending peer and there is no cap: every
    /// distinct name adds a registry that lives as long as the directory,
    /// even after its last ad is removed.
    pub fn find_or_create(&self, type_name: &str) -> SharedRegistry {
        if let Some(existing) = self.find(type_name) {
            return existing;
        }
        self.tables
            .entry(type_name.to_string())
            .or_insert_with(|| {
                info!(
                    target: "adcollector::registry",
                    ad_type = %type_name,
                    "creating new table for type"
                );
                AdRegistry::shared(AdKind::generic(type_name))
            })
            .value()
            .clone()
    }

    /// Names of every generic type seen so far, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Every generic registry, sorted by type name
    pub fn registries(&self) -> Vec<SharedRegistry> {
        let mut entries: Vec<(String, SharedRegistry)> = self
            .tables
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, reg)| reg).collect()
    }

    /// Number of generic types
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no generic type has been seen
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
