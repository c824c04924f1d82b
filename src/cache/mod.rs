//! The external cache service contract plus two reference implementations.
//!
//! The cache service is an out-of-scope external collaborator — the core
//! only depends on the [`CacheGateway`] trait. This crate ships both an
//! in-process [`MemoryCacheGateway`] (handy for tests and single-process
//! use) and a [`FileCacheGateway`] that persists entries to disk with
//! cross-process file locking, which is closer to how a real shared cache
//! daemon behaves: concurrent, outlives the process, visible to other
//! resolvers.

mod file;
mod memory;

pub use file::FileCacheGateway;
pub use memory::MemoryCacheGateway;

use crate::error::ResolverError;
use crate::types::CacheEntry;

/// Typed key/value access to the external shared cache, scoped to a single
/// namespace. All resolve traffic uses the `"resolve"`
/// namespace ([`crate::key_builder::RESOLVE_NAMESPACE`]).
pub trait CacheGateway: Send + Sync {
    /// Whether the cache backend is currently usable. A `false` here must
    /// make every lookup behave as a miss and every store a no-op —
    /// callers never need to check this themselves before calling
    /// `get`/`set`.
    fn enabled(&self) -> bool;

    /// Fetches the entry at `key` in `namespace`, or `None` if absent.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, ResolverError>;

    /// Inserts or overwrites the entry at `key` in `namespace`.
    fn set(&self, namespace: &str, key: &str, value: &CacheEntry) -> Result<(), ResolverError>;

    /// Removes the entry at `key` in `namespace`. Idempotent: deleting an
    /// already-absent key is not an error.
    fn delete(&self, namespace: &str, key: &str) -> Result<(), ResolverError>;
}
