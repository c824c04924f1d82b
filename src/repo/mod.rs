//! The package repository contract.
//!
//! The repository layer is an out-of-scope external collaborator: the core
//! only depends on [`RepoGateway`]. This crate ships one concrete
//! implementation, [`FilesystemRepoGateway`], that resolves search paths to
//! on-disk package trees.

mod filesystem;

pub use filesystem::FilesystemRepoGateway;

use crate::error::ResolverError;
use crate::types::{Variant, VariantHandle, VariantResource, VariantStateHandle};
use std::path::{Path, PathBuf};

/// Abstracts package repositories: release-time queries, variant state
/// handles, and stable repository identity.
pub trait RepoGateway: Send + Sync {
    /// Stable identity string for the repository rooted at `path`. Must be
    /// derived from repository type plus location,
    /// never from content, so it stays cheap and doesn't itself need
    /// invalidation.
    fn repository_id(&self, path: &Path) -> Result<String, ResolverError>;

    /// Seconds since epoch of the most recent known release of `name`
    /// across all of `package_paths`, or `0` if unknown.
    fn last_release_time(&self, name: &str, package_paths: &[PathBuf]) -> Result<u64, ResolverError>;

    /// A value whose inequality over time indicates `resource`'s on-disk
    /// definition has changed.
    fn variant_state_handle(&self, resource: &VariantResource) -> Result<VariantStateHandle, ResolverError>;

    /// Re-materializes a full [`Variant`] from an opaque handle produced by
    /// the solver.
    fn materialize_variant(&self, handle: &VariantHandle) -> Result<Variant, ResolverError>;
}
