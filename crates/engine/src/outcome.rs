//! Result of a collect call

use adcollector_core::{Ad, AdKey, AdKind};
use std::fmt;

/// What happened to an inbound ad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectOutcome {
    /// Stored under a new key
    Inserted,
    /// Replaced or merged into an existing ad
    Updated,
    /// Command code not recognised
    UnknownCommand,
    /// Query or invalidation command, left to the caller
    NotImplementedHere,
    /// No key could be derived, or a generic ad had no `MyType`
    KeyDerivationFailed,
    /// Refused by the admission policy
    Rejected,
    /// Merge for a key with no stored ad
    MergeTargetMissing,
    /// The transport delivered no ad
    MissingAd,
}

impl CollectOutcome {
    /// Integer status: 1 insert, 0 update, negative for failures
    pub fn code(&self) -> i32 {
        match self {
            CollectOutcome::Inserted => 1,
            CollectOutcome::Updated => 0,
            CollectOutcome::UnknownCommand => -1,
            CollectOutcome::NotImplementedHere => -2,
            CollectOutcome::KeyDerivationFailed => -3,
            CollectOutcome::Rejected => -4,
            CollectOutcome::MergeTargetMissing => -5,
            CollectOutcome::MissingAd => -6,
        }
    }

    /// Whether an ad was stored
    pub fn is_stored(&self) -> bool {
        matches!(self, CollectOutcome::Inserted | CollectOutcome::Updated)
    }
}

impl fmt::Display for CollectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollectOutcome::Inserted => "inserted",
            CollectOutcome::Updated => "updated",
            CollectOutcome::UnknownCommand => "unknown-command",
            CollectOutcome::NotImplementedHere => "not-implemented-here",
            CollectOutcome::KeyDerivationFailed => "key-derivation-failed",
            CollectOutcome::Rejected => "rejected",
            CollectOutcome::MergeTargetMissing => "merge-target-missing",
            CollectOutcome::MissingAd => "missing-ad",
        };
        f.write_str(s)
    }
}

/// Outcome plus a copy of the stored ad
#[derive(Debug, Clone)]
pub struct CollectResult {
    /// What happened
    pub outcome: CollectOutcome,
    /// Registry the ad went to, when one was resolved
    pub kind: Option<AdKind>,
    /// Key it was stored under, when one was derived
    pub key: Option<AdKey>,
    /// The ad as stored, after stamping or merging
    pub ad: Option<Ad>,
}

impl CollectResult {
    pub(crate) fn failed(outcome: CollectOutcome) -> Self {
        Self {
            outcome,
            kind: None,
            key: None,
            ad: None,
        }
    }

    pub(crate) fn stored(outcome: CollectOutcome, kind: AdKind, key: AdKey, ad: Ad) -> Self {
        Self {
            outcome,
            kind: Some(kind),
            key: Some(key),
            ad: Some(ad),
        }
    }

    /// Shorthand for `self.outcome.is_stored()`
    pub fn is_stored(&self) -> bool {
        self.outcome.is_stored()
    }
}
