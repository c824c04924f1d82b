//! Package resolution core for a multi-version software environment manager.
//!
//! Combines an iterative, depth-limited invocation of an external constraint
//! solver with a content-aware memoization layer backed by a shared cache
//! service, and the invalidation protocol that keeps memoized solves safe
//! across package releases and ad-hoc package-definition edits.
//!
//! The solver, the package repository, and the cache service are all
//! external collaborators, specified here only as traits ([`solver::Solver`],
//! [`repo::RepoGateway`], [`cache::CacheGateway`]) with one concrete,
//! fully-functional implementation each.

pub mod cache;
pub mod cache_protocol;
pub mod config;
pub mod error;
pub mod iterative_driver;
pub mod key_builder;
pub mod repo;
pub mod resolver;
pub mod solver;
#[cfg(feature = "test-utils")]
pub mod test_utils;
pub mod types;

pub use config::ResolverConfig;
pub use error::{ErrorContext, ResolverError};
pub use resolver::Resolver;
pub use types::{PackageRequest, ResolverStatus, Variant, VersionRange};
