//! Stable, order-sensitive fingerprinting of a resolve request.
//!
//! A [`ResolveKey`] is built once per resolve (twice, if a timestamped
//! lookup is needed) and serializes deterministically: two resolvers
//! constructed with the same ordered inputs always produce byte-identical
//! keys, and permuting requests or search paths always changes the key.

use crate::types::PackageRequest;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Namespace all resolve cache entries live under in the external cache
/// service (see [`crate::cache::CacheGateway`]).
pub const RESOLVE_NAMESPACE: &str = "resolve";

/// The fingerprint tuple, in field order. Field order matters: it is part
/// of what makes serialization deterministic, since
/// `serde_json` serializes a struct's fields in declaration order rather
/// than sorting keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveKey {
    requests: Vec<String>,
    repo_ids: Vec<String>,
    building: bool,
    prune_failed_graph: bool,
    start_depth: u32,
    max_depth: u32,
    /// Present only for the timestamped variant of the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u64>,
}

impl ResolveKey {
    /// Canonical string form, suitable as a `CacheGateway` key. Derived by
    /// hashing the deterministic JSON encoding of the tuple (SHA-256, hex)
    /// rather than using the JSON directly, so keys stay a fixed, opaque
    /// shape regardless of how large the request list gets.
    pub fn canonical(&self) -> String {
        // `serde_json::to_vec` on a struct never fails for our field types.
        let encoded = serde_json::to_vec(self).expect("ResolveKey is always serializable");
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        hex::encode(hasher.finalize())
    }
}

/// Builds [`ResolveKey`]s from the ordered inputs of a resolve.
pub struct KeyBuilder<'a> {
    requests: &'a [PackageRequest],
    repo_ids: &'a [String],
    building: bool,
    prune_failed_graph: bool,
    start_depth: u32,
    max_depth: u32,
}

impl<'a> KeyBuilder<'a> {
    pub fn new(
        requests: &'a [PackageRequest],
        repo_ids: &'a [String],
        building: bool,
        prune_failed_graph: bool,
        start_depth: u32,
        max_depth: u32,
    ) -> Self {
        Self {
            requests,
            repo_ids,
            building,
            prune_failed_graph,
            start_depth,
            max_depth,
        }
    }

    fn base(&self) -> (Vec<String>, Vec<String>) {
        (
            self.requests.iter().map(ToString::to_string).collect(),
            self.repo_ids.to_vec(),
        )
    }

    /// The non-timestamped key: reusable by any timestamp at or after the
    /// cache's latest recorded releases.
    pub fn non_timestamped_key(&self) -> ResolveKey {
        let (requests, repo_ids) = self.base();
        ResolveKey {
            requests,
            repo_ids,
            building: self.building,
            prune_failed_graph: self.prune_failed_graph,
            start_depth: self.start_depth,
            max_depth: self.max_depth,
            timestamp: None,
        }
    }

    /// The timestamped key for a pinned resolve at time `timestamp`.
    /// `timestamp` must be strictly positive.
    pub fn timestamped_key(&self, timestamp: u64) -> ResolveKey {
        debug_assert!(timestamp > 0, "timestamped key requires a positive timestamp");
        let (requests, repo_ids) = self.base();
        ResolveKey {
            requests,
            repo_ids,
            building: self.building,
            prune_failed_graph: self.prune_failed_graph,
            start_depth: self.start_depth,
            max_depth: self.max_depth,
            timestamp: Some(timestamp),
        }
    }
}

/// Renders a repository identity string from type plus location, never
/// content. Shared by every [`crate::repo::RepoGateway`]
/// implementation so identities stay comparable across gateway kinds.
pub fn filesystem_repo_id(path: &Path) -> String {
    format!("filesystem@{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionRange;

    fn reqs(names: &[&str]) -> Vec<PackageRequest> {
        names.iter().map(|n| PackageRequest::any(*n)).collect()
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let r1 = reqs(&["a", "b"]);
        let r2 = reqs(&["a", "b"]);
        let ids = vec!["filesystem@/repo".to_string()];
        let k1 = KeyBuilder::new(&r1, &ids, false, false, 0, 0).non_timestamped_key();
        let k2 = KeyBuilder::new(&r2, &ids, false, false, 0, 0).non_timestamped_key();
        assert_eq!(k1.canonical(), k2.canonical());
    }

    #[test]
    fn request_order_changes_the_key() {
        let r1 = reqs(&["a", "b"]);
        let r2 = reqs(&["b", "a"]);
        let ids = vec!["filesystem@/repo".to_string()];
        let k1 = KeyBuilder::new(&r1, &ids, false, false, 0, 0).non_timestamped_key();
        let k2 = KeyBuilder::new(&r2, &ids, false, false, 0, 0).non_timestamped_key();
        assert_ne!(k1.canonical(), k2.canonical());
    }

    #[test]
    fn path_order_changes_the_key() {
        let r = reqs(&["a"]);
        let ids1 = vec!["filesystem@/repo1".to_string(), "filesystem@/repo2".to_string()];
        let ids2 = vec!["filesystem@/repo2".to_string(), "filesystem@/repo1".to_string()];
        let k1 = KeyBuilder::new(&r, &ids1, false, false, 0, 0).non_timestamped_key();
        let k2 = KeyBuilder::new(&r, &ids2, false, false, 0, 0).non_timestamped_key();
        assert_ne!(k1.canonical(), k2.canonical());
    }

    #[test]
    fn timestamp_only_affects_timestamped_key() {
        let r = reqs(&["a"]);
        let ids = vec!["filesystem@/repo".to_string()];
        let builder = KeyBuilder::new(&r, &ids, false, false, 0, 0);
        let nt = builder.non_timestamped_key();
        let t1 = builder.timestamped_key(100);
        let t2 = builder.timestamped_key(200);
        assert_ne!(nt.canonical(), t1.canonical());
        assert_ne!(t1.canonical(), t2.canonical());
    }

    #[test]
    fn building_and_prune_flags_are_distinguishing() {
        let r = reqs(&["a"]);
        let ids = vec!["filesystem@/repo".to_string()];
        let k1 = KeyBuilder::new(&r, &ids, false, false, 0, 0).non_timestamped_key();
        let k2 = KeyBuilder::new(&r, &ids, true, false, 0, 0).non_timestamped_key();
        let k3 = KeyBuilder::new(&r, &ids, false, true, 0, 0).non_timestamped_key();
        assert_ne!(k1.canonical(), k2.canonical());
        assert_ne!(k1.canonical(), k3.canonical());
    }

    #[test]
    fn depth_fields_are_distinguishing() {
        let r = reqs(&["a"]);
        let ids = vec!["filesystem@/repo".to_string()];
        let k1 = KeyBuilder::new(&r, &ids, false, false, 0, 0).non_timestamped_key();
        let k2 = KeyBuilder::new(&r, &ids, false, false, 4, 32).non_timestamped_key();
        assert_ne!(k1.canonical(), k2.canonical());
    }

    #[test]
    fn rendered_form_distinguishes_requests_with_ranges() {
        let req = PackageRequest::new("python", VersionRange::Any);
        assert_eq!(req.to_string(), "python");
    }
}
