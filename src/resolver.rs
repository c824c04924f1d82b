//! The Resolver facade: the single entry point tying the key builder, cache
//! protocol, iterative driver and solver adapter together.

use crate::cache::CacheGateway;
use crate::cache_protocol::{CacheProtocol, LookupOutcome};
use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::iterative_driver::{IterationRecord, IterativeDriver};
use crate::key_builder::KeyBuilder;
use crate::repo::RepoGateway;
use crate::solver::{SolveParams, Solver, SolverAdapter};
use crate::types::{CacheEntry, PackageRequest, ResolveGraph, ResolverStatus, SolverDict, Variant};
use std::path::PathBuf;
use tracing::{debug, error, info_span};

/// A single resolve. Constructed with immutable inputs; `solve()` mutates it
/// exactly once (a single-shot lifecycle), after which every other method
/// is a read-only projection.
pub struct Resolver<'a, S, C, R> {
    requests: Vec<PackageRequest>,
    package_paths: Vec<PathBuf>,
    repo_ids: Vec<String>,
    timestamp: u64,
    building: bool,
    verbosity: bool,
    prune_failed_graph: bool,
    start_depth: u32,
    max_depth: u32,
    caching: bool,
    config: ResolverConfig,
    callback: Option<&'a dyn Fn() -> bool>,
    package_load_callback: Option<&'a dyn Fn(&str)>,
    adapter: &'a SolverAdapter<S>,
    cache: &'a C,
    repo: &'a R,
    solved: bool,
    dict: SolverDict,
    from_cache: bool,
    resolved_packages: Vec<Variant>,
    iteration_history: Vec<IterationRecord>,
}

impl<'a, S: Solver, C: CacheGateway, R: RepoGateway> Resolver<'a, S, C, R> {
    /// Validates `max_depth >= start_depth` (when both are set), derives
    /// stable repository identities for every search path, and leaves the
    /// instance in `pending` status.
    #[allow(clippy::too_many_arguments)]
    pub fn construct(
        package_requests: Vec<PackageRequest>,
        package_paths: Vec<PathBuf>,
        adapter: &'a SolverAdapter<S>,
        cache: &'a C,
        repo: &'a R,
        config: ResolverConfig,
        timestamp: u64,
        building: bool,
        verbosity: bool,
        caching: bool,
        start_depth: u32,
        max_depth: u32,
        callback: Option<&'a dyn Fn() -> bool>,
        package_load_callback: Option<&'a dyn Fn(&str)>,
    ) -> Result<Self, ResolverError> {
        if max_depth > 0 && start_depth > 0 && max_depth < start_depth {
            error!(start_depth, max_depth, "invalid depth range at construction");
            return Err(ResolverError::InvalidDepthRange { start_depth, max_depth });
        }

        let repo_ids = package_paths
            .iter()
            .map(|path| repo.repository_id(path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            requests: package_requests,
            package_paths,
            repo_ids,
            timestamp,
            building,
            verbosity,
            prune_failed_graph: config.prune_failed_graph,
            start_depth,
            max_depth,
            caching,
            config,
            callback,
            package_load_callback,
            adapter,
            cache,
            repo,
            solved: false,
            dict: SolverDict::pending(),
            from_cache: false,
            resolved_packages: Vec::new(),
            iteration_history: Vec::new(),
        })
    }

    fn key_builder(&self) -> KeyBuilder<'_> {
        KeyBuilder::new(
            &self.requests,
            &self.repo_ids,
            self.building,
            self.prune_failed_graph,
            self.start_depth,
            self.max_depth,
        )
    }

    /// Runs the resolve. Idempotent: a second call on an already-resolved
    /// instance is a no-op, per the single-shot lifecycle invariant.
    pub fn solve(&mut self) {
        if self.solved {
            return;
        }
        self.solved = true;

        let span = info_span!("solve", requests = self.requests.len(), timestamp = self.timestamp);
        let _enter = span.enter();

        let key_builder = self.key_builder();
        let protocol = CacheProtocol::new(self.cache, self.repo);

        match protocol.lookup(
            &key_builder,
            self.timestamp,
            &self.package_paths,
            self.config.resolve_caching,
            self.caching,
        ) {
            LookupOutcome::Hit(entry) => {
                debug!("resolve served from cache");
                self.from_cache = true;
                self.apply_dict(entry.solver_dict);
            }
            LookupOutcome::Miss => {
                self.from_cache = false;
                self.run_live(&key_builder, &protocol);
            }
        }
    }

    fn run_live(&mut self, key_builder: &KeyBuilder<'_>, protocol: &CacheProtocol<'_, C, R>) {
        let params = SolveParams {
            package_requests: &self.requests,
            package_paths: &self.package_paths,
            timestamp: self.timestamp,
            building: self.building,
            verbosity: self.verbosity,
            prune_unfailed: self.prune_failed_graph,
            callback: self.callback,
            package_load_callback: self.package_load_callback,
        };

        let driver = IterativeDriver::new(self.adapter);
        let (dict, history) = driver.run(&params, self.start_depth, self.max_depth);
        self.iteration_history = history;

        let status = dict.status;
        let resolved_names: Vec<String> = dict
            .variant_handles
            .iter()
            .filter_map(|h| h.name().map(str::to_string))
            .collect();
        let entry_without_state = CacheEntry {
            solver_dict: dict.clone(),
            release_times: Default::default(),
            variant_states: Default::default(),
        };

        self.apply_dict(dict);

        let outcome = protocol.store(
            key_builder,
            status,
            entry_without_state,
            &resolved_names,
            &self.package_paths,
            self.timestamp,
            self.config.resolve_caching,
            self.caching,
        );
        debug!(?outcome, "resolve cache store outcome");
    }

    fn apply_dict(&mut self, dict: SolverDict) {
        if dict.status == ResolverStatus::Solved {
            self.resolved_packages = dict
                .variant_handles
                .iter()
                .filter_map(|handle| self.repo.materialize_variant(handle).ok())
                .collect();
        }
        self.dict = dict;
    }

    pub fn status(&self) -> ResolverStatus {
        self.dict.status
    }

    pub fn resolved_packages(&self) -> &[Variant] {
        &self.resolved_packages
    }

    pub fn graph(&self) -> &ResolveGraph {
        &self.dict.graph
    }

    pub fn failure_description(&self) -> Option<&str> {
        self.dict.failure_description.as_deref()
    }

    pub fn solve_time(&self) -> f64 {
        self.dict.solve_time
    }

    pub fn load_time(&self) -> f64 {
        self.dict.load_time
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn iteration_history(&self) -> &[IterationRecord] {
        &self.iteration_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheGateway;
    use crate::repo::FilesystemRepoGateway;
    use crate::solver::reference::RangeMatchSolver;
    use crate::types::{PackageRequest, VersionRange};
    use semver::VersionReq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_package(root: &std::path::Path, name: &str, version: &str) {
        let dir = root.join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("package.toml"), "name = \"x\"").unwrap();
    }

    fn harness(dir: &TempDir) -> (SolverAdapter<RangeMatchSolver>, MemoryCacheGateway, FilesystemRepoGateway) {
        let repo_for_solver = Arc::new(FilesystemRepoGateway::new());
        let solver = RangeMatchSolver::new(repo_for_solver);
        let adapter = SolverAdapter::new(solver);
        let cache = MemoryCacheGateway::new();
        let repo = FilesystemRepoGateway::new();
        let _ = dir;
        (adapter, cache, repo)
    }

    #[test]
    fn first_solve_is_live_and_caches_then_second_solve_hits() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "foo", "1.0.0");
        let (adapter, cache, repo) = harness(&dir);

        let requests = vec![PackageRequest::any("foo")];
        let paths = vec![dir.path().to_path_buf()];
        let config = ResolverConfig::default();

        let mut r1 = Resolver::construct(
            requests.clone(),
            paths.clone(),
            &adapter,
            &cache,
            &repo,
            config.clone(),
            0,
            false,
            false,
            true,
            0,
            0,
            None,
            None,
        )
        .unwrap();
        r1.solve();
        assert_eq!(r1.status(), ResolverStatus::Solved);
        assert!(!r1.from_cache());
        assert_eq!(r1.resolved_packages().len(), 1);

        let mut r2 = Resolver::construct(
            requests, paths, &adapter, &cache, &repo, config, 0, false, false, true, 0, 0, None, None,
        )
        .unwrap();
        r2.solve();
        assert_eq!(r2.status(), ResolverStatus::Solved);
        assert!(r2.from_cache());
    }

    #[test]
    fn solve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "foo", "1.0.0");
        let (adapter, cache, repo) = harness(&dir);
        let requests = vec![PackageRequest::any("foo")];
        let paths = vec![dir.path().to_path_buf()];

        let mut r = Resolver::construct(
            requests,
            paths,
            &adapter,
            &cache,
            &repo,
            ResolverConfig::default(),
            0,
            false,
            false,
            true,
            0,
            0,
            None,
            None,
        )
        .unwrap();
        r.solve();
        let first_time = r.solve_time();
        r.solve();
        assert_eq!(r.solve_time(), first_time);
    }

    #[test]
    fn construct_rejects_max_depth_below_start_depth() {
        let dir = TempDir::new().unwrap();
        let (adapter, cache, repo) = harness(&dir);
        let result = Resolver::construct(
            Vec::new(),
            Vec::new(),
            &adapter,
            &cache,
            &repo,
            ResolverConfig::default(),
            0,
            false,
            false,
            true,
            16,
            4,
            None,
            None,
        );
        assert!(matches!(result, Err(ResolverError::InvalidDepthRange { .. })));
    }

    #[test]
    fn failed_solve_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let (adapter, cache, repo) = harness(&dir);
        let requests = vec![PackageRequest::new("foo", VersionRange::Req(VersionReq::parse("=9.9.9").unwrap()))];
        let paths = vec![dir.path().to_path_buf()];

        let mut r1 = Resolver::construct(
            requests.clone(),
            paths.clone(),
            &adapter,
            &cache,
            &repo,
            ResolverConfig::default(),
            0,
            false,
            false,
            true,
            0,
            0,
            None,
            None,
        )
        .unwrap();
        r1.solve();
        assert_eq!(r1.status(), ResolverStatus::Failed);
        assert!(r1.failure_description().is_some());

        let mut r2 = Resolver::construct(
            requests,
            paths,
            &adapter,
            &cache,
            &repo,
            ResolverConfig::default(),
            0,
            false,
            false,
            true,
            0,
            0,
            None,
            None,
        )
        .unwrap();
        r2.solve();
        assert!(!r2.from_cache());
    }
}
