//! Applying inbound ads to the registries

use adcollector_core::{attrs, Ad, AdKey, AdKind, AdType, Command, Result};
use adcollector_storage::AdRegistry;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::CollectorEngine;
use crate::outcome::{CollectOutcome, CollectResult};
use crate::transport::AdSource;

impl CollectorEngine {
    // =========================================================================
    // Entry points
    // =========================================================================

    /// Read one ad from `source` and apply it
    ///
    /// The transport's authenticated identity, if any, is stamped onto the
    /// ad as `AuthenticatedIdentity` and `AuthenticationMethod`; otherwise
    /// both attributes are stripped so a peer cannot claim one. A read that
    /// times out yields [`CollectOutcome::MissingAd`]. Transport failures
    /// are returned as errors.
    pub fn collect_from(&self, command: Command, source: &mut dyn AdSource) -> Result<CollectResult> {
        let timeout = Duration::from_secs(self.config.read_timeout_secs);
        let Some(mut ad) = source.read_ad(timeout)? else {
            warn!(
                target: "adcollector::engine",
                peer = %source.peer(),
                command = %command,
                "no ad received"
            );
            return Ok(CollectResult::failed(CollectOutcome::MissingAd));
        };

        match source.authenticated_identity() {
            Some(identity) => {
                ad.insert(attrs::AUTHENTICATED_IDENTITY, identity.user);
                ad.insert(attrs::AUTHENTICATION_METHOD, identity.method);
            }
            None => {
                ad.remove(attrs::AUTHENTICATED_IDENTITY);
                ad.remove(attrs::AUTHENTICATION_METHOD);
            }
        }

        Ok(self.collect(command, ad, Some(source)))
    }

    /// Apply an already decoded ad
    ///
    /// `source` is only consulted for the private companion of a startd
    /// update; pass `None` when there is no peer to read it from.
    pub fn collect(
        &self,
        command: Command,
        ad: Ad,
        mut source: Option<&mut dyn AdSource>,
    ) -> CollectResult {
        let peer = source
            .as_ref()
            .map(|s| s.peer())
            .unwrap_or_else(|| "local".to_string());

        match command {
            Command::Query(_) | Command::Invalidate(_) => {
                debug!(
                    target: "adcollector::engine",
                    peer = %peer,
                    command = %command,
                    "command left to the caller"
                );
                return CollectResult::failed(CollectOutcome::NotImplementedHere);
            }
            Command::Unknown(code) => {
                warn!(
                    target: "adcollector::engine",
                    peer = %peer,
                    code,
                    "received illegal command"
                );
                return CollectResult::failed(CollectOutcome::UnknownCommand);
            }
            _ => {}
        }

        if self.admission.read().validate(command, &ad, &peer).is_err() {
            return CollectResult::failed(CollectOutcome::Rejected);
        }

        let Some(kind) = resolve_kind(command, &ad) else {
            warn!(
                target: "adcollector::engine",
                peer = %peer,
                "generic update has no MyType, ignoring ad"
            );
            return CollectResult::failed(CollectOutcome::KeyDerivationFailed);
        };

        let key = match AdKey::derive(&kind, &ad) {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    target: "adcollector::engine",
                    peer = %peer,
                    ad_type = %kind,
                    error = %e,
                    "could not make key, ignoring ad"
                );
                return CollectResult::failed(CollectOutcome::KeyDerivationFailed);
            }
        };

        if command.is_merge() {
            return self.merge_ad(kind, key, ad);
        }

        let repeat = if command.carries_private_ad() && self.config.repeat_startd_ads > 0 {
            Some(ad.clone())
        } else {
            None
        };

        let now = self.now();
        let registry = self.tables.find_or_create(&kind);
        let (outcome, stored) = {
            let mut guard = registry.write();
            if self.is_singleton(&kind) {
                let purged = guard.purge();
                if purged > 0 {
                    info!(
                        target: "adcollector::engine",
                        ad_type = %kind,
                        purged,
                        "purged singleton registry"
                    );
                }
            }
            self.update_ad(&mut guard, key.clone(), ad, now)
        };

        if command.carries_private_ad() {
            match source.as_deref_mut() {
                Some(source) => self.collect_private(&key, &stored, source),
                None => debug!(
                    target: "adcollector::engine",
                    key = %key,
                    "no source for private ad"
                ),
            }
        }

        if let Some(template) = repeat {
            self.repeat_startd(&template, now);
        }

        CollectResult::stored(outcome, kind, key, stored)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn is_singleton(&self, kind: &AdKind) -> bool {
        match kind.as_builtin() {
            Some(AdType::Negotiator) => self.config.allow_only_one_negotiator,
            Some(AdType::LeaseManager) => true,
            _ => false,
        }
    }

    /// Insert or replace under an already held write lock
    pub(crate) fn update_ad(
        &self,
        registry: &mut AdRegistry,
        key: AdKey,
        mut ad: Ad,
        now: i64,
    ) -> (CollectOutcome, Ad) {
        let kind = registry.kind().clone();
        let private = kind.as_builtin().map_or(false, |t| t.is_private());
        ad.stamp_last_heard_from(now);

        let forward = self.forward.read();
        let filtered = forward.applies_to(&kind);

        let outcome = match registry.get(&key) {
            None => {
                if !private {
                    self.stats.record(kind.label(), None, &ad);
                }
                if filtered {
                    forward.stamp_insert(&mut ad, now);
                }
                info!(target: "adcollector::engine", ad_type = %kind, key = %key, "new ad");
                CollectOutcome::Inserted
            }
            Some(old) => {
                if !private {
                    self.stats.record(kind.label(), Some(old), &ad);
                }
                if filtered {
                    let decision = forward.stamp_update(old, &mut ad, now);
                    debug!(
                        target: "adcollector::engine",
                        ad_type = %kind,
                        key = %key,
                        forward = decision.forward,
                        "forwarding decision"
                    );
                }
                debug!(target: "adcollector::engine", ad_type = %kind, key = %key, "updating ad");
                CollectOutcome::Updated
            }
        };

        registry.insert(key, ad.clone());
        (outcome, ad)
    }

    fn merge_ad(&self, kind: AdKind, key: AdKey, mut update: Ad) -> CollectResult {
        let registry = self.tables.find_or_create(&kind);
        let mut guard = registry.write();
        let Some(existing) = guard.get_mut(&key) else {
            info!(
                target: "adcollector::engine",
                ad_type = %kind,
                key = %key,
                "merge target not found, ignoring ad"
            );
            return CollectResult::failed(CollectOutcome::MergeTargetMissing);
        };

        for name in attrs::MERGE_PROTECTED {
            update.remove(name);
        }
        existing.merge_from(&update);
        debug!(target: "adcollector::engine", ad_type = %kind, key = %key, "merged ad");

        let merged = existing.clone();
        CollectResult::stored(CollectOutcome::Updated, kind, key, merged)
    }

    fn collect_private(&self, key: &AdKey, public: &Ad, source: &mut dyn AdSource) {
        let mut private = match source.read_ad(self.client_timeout()) {
            Ok(Some(ad)) => ad,
            Ok(None) => {
                debug!(
                    target: "adcollector::engine",
                    peer = %source.peer(),
                    key = %key,
                    "could not get startd's private ad"
                );
                return;
            }
            Err(e) => {
                debug!(
                    target: "adcollector::engine",
                    peer = %source.peer(),
                    key = %key,
                    error = %e,
                    "could not get startd's private ad"
                );
                return;
            }
        };

        // Queries select private ads by type; the negotiator pairs them with
        // public ads by address and name.
        private.set_my_type(attrs::STARTD_ADTYPE);
        private.copy_attribute_from(attrs::MY_ADDRESS, public);
        private.copy_attribute_from(attrs::NAME, public);

        let registry = self.tables.builtin(AdType::StartdPrivate);
        let mut guard = registry.write();
        self.update_ad(&mut guard, key.clone(), private, self.now());
    }

    fn repeat_startd(&self, template: &Ad, now: i64) {
        let name = template.lookup_string(attrs::NAME).unwrap_or_default();
        let registry = self.tables.builtin(AdType::Startd);
        for n in 0..self.config.repeat_startd_ads {
            let mut fake = template.clone();
            fake.insert(attrs::NAME, format!("fake{}-{}", n, name));
            match AdKey::derive_builtin(AdType::Startd, &fake) {
                Ok(key) => {
                    let mut guard = registry.write();
                    self.update_ad(&mut guard, key, fake, now);
                }
                Err(e) => warn!(
                    target: "adcollector::engine",
                    error = %e,
                    "could not make key for repeated startd ad"
                ),
            }
        }
    }
}

/// Registry an update command targets; generic updates name it in `MyType`
fn resolve_kind(command: Command, ad: &Ad) -> Option<AdKind> {
    match command.ad_type() {
        Some(t) => Some(AdKind::Builtin(t)),
        None => ad.my_type().map(AdKind::Generic),
    }
}
