//! The two-tier memoization and invalidation protocol.
//!
//! [`CacheProtocol`] is deliberately side-effect-ordered: predicates are
//! evaluated in a fixed sequence (fingerprint miss, then
//! `packages_changed`, then `releases_since`, then `timestamp_earlier`) so a
//! cheap check always short-circuits an expensive one, and deletions are
//! issued before a miss is ever returned.

use crate::cache::CacheGateway;
use crate::key_builder::{KeyBuilder, RESOLVE_NAMESPACE};
use crate::repo::RepoGateway;
use crate::types::{CacheEntry, ResolverStatus};
use std::path::PathBuf;
use tracing::debug;

/// Outcome of a [`CacheProtocol::lookup`].
pub enum LookupOutcome {
    Hit(CacheEntry),
    Miss,
}

/// Whether a [`CacheProtocol::store`] actually wrote an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    WroteNonTimestamped,
    WroteTimestamped,
    Skipped,
}

pub struct CacheProtocol<'a, C, R> {
    cache: &'a C,
    repo: &'a R,
}

impl<'a, C: CacheGateway, R: RepoGateway> CacheProtocol<'a, C, R> {
    pub fn new(cache: &'a C, repo: &'a R) -> Self {
        Self { cache, repo }
    }

    fn bypassed(&self, resolve_caching: bool, resolver_caching: bool) -> bool {
        !resolve_caching || !resolver_caching || !self.cache.enabled()
    }

    /// True iff some resolved variant's current on-disk state disagrees
    /// with what was cached.
    fn packages_changed(&self, entry: &CacheEntry) -> bool {
        for handle in &entry.solver_dict.variant_handles {
            let Some(name) = handle.name() else { continue };
            let Ok(variant) = self.repo.materialize_variant(handle) else {
                return true;
            };
            let Ok(current_state) = self.repo.variant_state_handle(&variant.resource) else {
                return true;
            };
            match entry.variant_states.get(name) {
                Some(cached_state) if cached_state == &current_state => {}
                _ => return true,
            }
        }
        false
    }

    /// True iff some package's last-release-time has moved since the entry
    /// was cached.
    fn releases_since(&self, entry: &CacheEntry, package_paths: &[PathBuf]) -> bool {
        for (name, cached_time) in &entry.release_times {
            match self.repo.last_release_time(name, package_paths) {
                Ok(current) if current == *cached_time => {}
                _ => return true,
            }
        }
        false
    }

    /// True iff the cached entry has seen a release newer than `timestamp`.
    fn timestamp_earlier(entry: &CacheEntry, timestamp: u64) -> bool {
        entry.release_times.values().any(|&cached_time| timestamp < cached_time)
    }

    /// Performs the full two-phase lookup: non-timestamped first, falling
    /// through to a timestamped entry only when needed.
    pub fn lookup(
        &self,
        key_builder: &KeyBuilder<'_>,
        timestamp: u64,
        package_paths: &[PathBuf],
        resolve_caching: bool,
        resolver_caching: bool,
    ) -> LookupOutcome {
        if self.bypassed(resolve_caching, resolver_caching) {
            return LookupOutcome::Miss;
        }

        let non_timestamped_key = key_builder.non_timestamped_key().canonical();
        let e0 = self
            .cache
            .get(RESOLVE_NAMESPACE, &non_timestamped_key)
            .ok()
            .flatten();

        if timestamp == 0 {
            let Some(entry) = e0 else {
                debug!(key = %non_timestamped_key, "resolve cache miss");
                return LookupOutcome::Miss;
            };
            if self.packages_changed(&entry) {
                debug!(key = %non_timestamped_key, "resolve cache entry stale: packages changed");
                let _ = self.cache.delete(RESOLVE_NAMESPACE, &non_timestamped_key);
                return LookupOutcome::Miss;
            }
            if self.releases_since(&entry, package_paths) {
                debug!(key = %non_timestamped_key, "resolve cache entry stale: releases since solve");
                let _ = self.cache.delete(RESOLVE_NAMESPACE, &non_timestamped_key);
                return LookupOutcome::Miss;
            }
            debug!(key = %non_timestamped_key, "resolve cache hit");
            return LookupOutcome::Hit(entry);
        }

        // Resolver carries a timestamp T.
        if let Some(entry) = &e0 {
            if self.packages_changed(entry) {
                let _ = self.cache.delete(RESOLVE_NAMESPACE, &non_timestamped_key);
            } else if self.releases_since(entry, package_paths) {
                let _ = self.cache.delete(RESOLVE_NAMESPACE, &non_timestamped_key);
            } else if !Self::timestamp_earlier(entry, timestamp) {
                debug!(key = %non_timestamped_key, "resolve cache hit (non-timestamped, reusable)");
                return LookupOutcome::Hit(entry.clone());
            }
            // else: fall through to the timestamped lookup.
        }

        let timestamped_key = key_builder.timestamped_key(timestamp).canonical();
        let e1 = self
            .cache
            .get(RESOLVE_NAMESPACE, &timestamped_key)
            .ok()
            .flatten();
        let Some(entry) = e1 else {
            debug!(key = %timestamped_key, "resolve cache miss (timestamped)");
            return LookupOutcome::Miss;
        };
        if self.packages_changed(&entry) {
            debug!(key = %timestamped_key, "resolve cache entry stale: packages changed");
            let _ = self.cache.delete(RESOLVE_NAMESPACE, &timestamped_key);
            return LookupOutcome::Miss;
        }
        debug!(key = %timestamped_key, "resolve cache hit (timestamped)");
        LookupOutcome::Hit(entry)
    }

    /// Performs the store half of the protocol. Requires the caller to
    /// have already materialized `resolved_names` (the names of the
    /// `solved` variant handles) so release times and state handles can be
    /// collected without re-deriving them here.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        key_builder: &KeyBuilder<'_>,
        status: ResolverStatus,
        entry_without_state: CacheEntry,
        resolved_names: &[String],
        package_paths: &[PathBuf],
        timestamp: u64,
        resolve_caching: bool,
        resolver_caching: bool,
    ) -> StoreOutcome {
        if self.bypassed(resolve_caching, resolver_caching) || status != ResolverStatus::Solved {
            return StoreOutcome::Skipped;
        }

        let mut release_times = std::collections::BTreeMap::new();
        let mut variant_states = std::collections::BTreeMap::new();
        let mut releases_since_solve = false;

        for (name, handle) in resolved_names.iter().zip(&entry_without_state.solver_dict.variant_handles) {
            let last_release = match self.repo.last_release_time(name, package_paths) {
                Ok(t) => t,
                Err(_) => return StoreOutcome::Skipped,
            };
            if last_release == 0 {
                debug!(name, "skipping resolve cache write: no known release time");
                return StoreOutcome::Skipped;
            }
            if timestamp > 0 && timestamp < last_release {
                releases_since_solve = true;
            }
            release_times.insert(name.clone(), last_release);

            let variant = match self.repo.materialize_variant(handle) {
                Ok(v) => v,
                Err(_) => return StoreOutcome::Skipped,
            };
            let state = match self.repo.variant_state_handle(&variant.resource) {
                Ok(s) => s,
                Err(_) => return StoreOutcome::Skipped,
            };
            variant_states.insert(name.clone(), state);
        }

        let entry = CacheEntry {
            solver_dict: entry_without_state.solver_dict,
            release_times,
            variant_states,
        };

        if timestamp > 0 && releases_since_solve {
            let key = key_builder.timestamped_key(timestamp).canonical();
            match self.cache.set(RESOLVE_NAMESPACE, &key, &entry) {
                Ok(()) => {
                    debug!(key = %key, "wrote timestamped resolve cache entry");
                    StoreOutcome::WroteTimestamped
                }
                Err(_) => StoreOutcome::Skipped,
            }
        } else {
            let key = key_builder.non_timestamped_key().canonical();
            match self.cache.set(RESOLVE_NAMESPACE, &key, &entry) {
                Ok(()) => {
                    debug!(key = %key, "wrote non-timestamped resolve cache entry");
                    StoreOutcome::WroteNonTimestamped
                }
                Err(_) => StoreOutcome::Skipped,
            }
        }
    }
}
