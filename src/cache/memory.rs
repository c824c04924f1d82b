//! In-process cache gateway backed by [`dashmap::DashMap`].
//!
//! Values are stored pre-serialized (`serde_json`) rather than as cloned
//! Rust values, so round-trip correctness — the property the cache
//! protocol actually depends on — is exercised by real (de)serialization
//! instead of a `Clone` impl that could silently diverge from it.

use super::CacheGateway;
use crate::error::ResolverError;
use crate::types::CacheEntry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory, thread-safe cache gateway. Multiple `Arc<MemoryCacheGateway>`
/// clones can stand in for "other resolvers in other processes" within a
/// single test process.
pub struct MemoryCacheGateway {
    entries: DashMap<(String, String), Vec<u8>>,
    enabled: AtomicBool,
}

impl MemoryCacheGateway {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: AtomicBool::new(true),
        }
    }

    /// Test/ops hook: simulate the cache service being unavailable. Every
    /// lookup becomes a miss and every store a no-op while disabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCacheGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheGateway for MemoryCacheGateway {
    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, ResolverError> {
        match self.entries.get(&(namespace.to_string(), key.to_string())) {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set(&self, namespace: &str, key: &str, value: &CacheEntry) -> Result<(), ResolverError> {
        let bytes = serde_json::to_vec(value)?;
        self.entries
            .insert((namespace.to_string(), key.to_string()), bytes);
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), ResolverError> {
        self.entries.remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResolverStatus, SolverDict};

    fn entry() -> CacheEntry {
        CacheEntry {
            solver_dict: SolverDict {
                status: ResolverStatus::Solved,
                ..SolverDict::pending()
            },
            release_times: Default::default(),
            variant_states: Default::default(),
        }
    }

    #[test]
    fn store_then_load_round_trips() {
        let gw = MemoryCacheGateway::new();
        gw.set("resolve", "k1", &entry()).unwrap();
        let loaded = gw.get("resolve", "k1").unwrap();
        assert_eq!(loaded, Some(entry()));
    }

    #[test]
    fn delete_on_absent_key_is_a_noop() {
        let gw = MemoryCacheGateway::new();
        assert!(gw.delete("resolve", "missing").is_ok());
        assert_eq!(gw.get("resolve", "missing").unwrap(), None);
    }

    #[test]
    fn disabled_gateway_reports_enabled_false() {
        let gw = MemoryCacheGateway::new();
        gw.set_enabled(false);
        assert!(!gw.enabled());
    }
}
