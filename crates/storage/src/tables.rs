//! The full set of registries held by a collector
//!
//! One registry per built-in [`AdType`] is created up front; generic
//! registries come and go through the [`GenericTypeDirectory`].
//! Cross-registry operations lock one registry at a time and never hold two
//! locks at once.

use adcollector_core::{Ad, AdKind, AdType, WalkScope};
use rustc_hash::FxHashMap;

use crate::directory::GenericTypeDirectory;
use crate::registry::{AdRegistry, SharedRegistry};

/// Every registry of a collector
#[derive(Debug)]
pub struct AdTables {
    builtin: FxHashMap<AdType, SharedRegistry>,
    generic: GenericTypeDirectory,
}

impl Default for AdTables {
    fn default() -> Self {
        Self::new()
    }
}

impl AdTables {
    /// Create empty registries for every built-in type
    pub fn new() -> Self {
        let builtin = AdType::ALL
            .iter()
            .map(|t| (*t, AdRegistry::shared(AdKind::Builtin(*t))))
            .collect();
        Self {
            builtin,
            generic: GenericTypeDirectory::new(),
        }
    }

    /// Registry of a built-in type
    pub fn builtin(&self, ad_type: AdType) -> &SharedRegistry {
        // Every built-in type gets a registry in `new`.
        &self.builtin[&ad_type]
    }

    /// The generic directory
    pub fn generic(&self) -> &GenericTypeDirectory {
        &self.generic
    }

    /// Registry for `kind` if it exists; generic registries are not created
    pub fn find(&self, kind: &AdKind) -> Option<SharedRegistry> {
        match kind {
            AdKind::Builtin(t) => Some(self.builtin(*t).clone()),
            AdKind::Generic(name) => self.generic.find(name),
        }
    }

    /// Registry for `kind`, creating a generic one on first use
    pub fn find_or_create(&self, kind: &AdKind) -> SharedRegistry {
        match kind {
            AdKind::Builtin(t) => self.builtin(*t).clone(),
            AdKind::Generic(name) => self.generic.find_or_create(name),
        }
    }

    /// Registries covered by `scope`, in visiting order
    ///
    /// `Any` follows [`AdType::WALK_ORDER`] and then the generic registries.
    pub fn in_scope(&self, scope: &WalkScope) -> Vec<SharedRegistry> {
        match scope {
            WalkScope::Type(kind) => self.find(kind).into_iter().collect(),
            WalkScope::AllGeneric => self.generic.registries(),
            WalkScope::Any => AdType::WALK_ORDER
                .iter()
                .map(|t| self.builtin(*t).clone())
                .chain(self.generic.registries())
                .collect(),
        }
    }

    /// Every registry, private ones included, then every generic registry
    pub fn all(&self) -> Vec<SharedRegistry> {
        AdType::ALL
            .iter()
            .map(|t| self.builtin(*t).clone())
            .chain(self.generic.registries())
            .collect()
    }

    /// Apply `predicate` to every ad in `scope`
    ///
    /// Every entry in scope is visited. Returns false if any call returned
    /// false. A scope naming a generic type that has never been seen is an
    /// empty walk.
    pub fn walk<F>(&self, scope: &WalkScope, mut predicate: F) -> bool
    where
        F: FnMut(&Ad) -> bool,
    {
        let mut all_accepted = true;
        for registry in self.in_scope(scope) {
            if !registry.read().walk(&mut predicate) {
                all_accepted = false;
            }
        }
        all_accepted
    }

    /// Number of ads of `kind`
    pub fn len(&self, kind: &AdKind) -> usize {
        self.find(kind).map(|r| r.read().len()).unwrap_or(0)
    }

    /// Number of ads across every registry
    pub fn total_len(&self) -> usize {
        self.all().iter().map(|r| r.read().len()).sum()
    }
}
