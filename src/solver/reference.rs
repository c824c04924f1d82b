//! A small, real solver behind the [`Solver`] port: for each request, picks
//! the highest version satisfying its range among the first `depth`
//! versions (newest-first) available from the repository gateway.
//!
//! This is deliberately not a general constraint search — that remains an
//! external collaborator's job — but it is a genuine implementation (not a
//! mock), so the `SolverAdapter` boundary and the `IterativeDriver`'s depth
//! escalation are both exercised against real behavior: a request can
//! legitimately fail at a shallow depth and succeed once the driver doubles
//! it.

use super::{ResolvedSolverVariant, SolveOutcome, SolveParams, SolveState, Solver};
use crate::repo::FilesystemRepoGateway;
use crate::types::{GraphEdge, GraphNode, ResolveGraph, VersionRange};
use petgraph::graph::DiGraph;
use semver::Version;
use std::sync::Arc;
use std::time::Instant;

pub struct RangeMatchSolver {
    repo: Arc<FilesystemRepoGateway>,
}

impl RangeMatchSolver {
    pub fn new(repo: Arc<FilesystemRepoGateway>) -> Self {
        Self { repo }
    }
}

fn satisfies(range: &VersionRange, version: &Version) -> bool {
    match range {
        VersionRange::Any => true,
        VersionRange::Req(req) => req.matches(version),
    }
}

/// The root search path a version was found under, recovered from its
/// definition path (`<root>/<name>/<version>/package.toml`).
fn root_of(definition_path: &std::path::Path) -> Option<&std::path::Path> {
    definition_path.ancestors().nth(3)
}

impl Solver for RangeMatchSolver {
    fn solve(&self, params: &SolveParams<'_>, depth: u32) -> SolveOutcome {
        let start = Instant::now();
        let mut graph: DiGraph<GraphNode, GraphEdge> = DiGraph::new();
        let mut resolved = Vec::new();
        let mut is_partial = false;
        let mut failure_description: Option<String> = None;
        let mut aborted_reason: Option<String> = None;

        'requests: for req in params.package_requests {
            if let Some(callback) = params.callback {
                if callback() {
                    aborted_reason = Some(format!("callback aborted before loading '{}'", req.name));
                    break 'requests;
                }
            }
            if let Some(load_cb) = params.package_load_callback {
                load_cb(&req.name);
            }

            let req_node = graph.add_node(GraphNode::Request(req.to_string()));

            let all_versions = self
                .repo
                .list_versions(&req.name, params.package_paths)
                .unwrap_or_default();
            let available = all_versions.len();
            let capped: Vec<_> = if depth == 0 {
                all_versions
            } else {
                all_versions.into_iter().take(depth as usize).collect()
            };
            if depth != 0 && available > capped.len() {
                is_partial = true;
            }

            match capped.iter().find(|(v, _)| satisfies(&req.range, v)) {
                Some((version, def_path)) => {
                    let repo_id = root_of(def_path)
                        .and_then(|root| self.repo.repository_id(root).ok())
                        .unwrap_or_default();
                    let handle = self.repo.make_variant_handle(&req.name, version, def_path, &repo_id);
                    let variant_node = graph.add_node(GraphNode::Variant {
                        name: req.name.clone(),
                        version: version.to_string(),
                    });
                    graph.add_edge(req_node, variant_node, GraphEdge::Requires);
                    resolved.push(ResolvedSolverVariant { userdata: handle });
                }
                None => {
                    let conflict = format!("no version of '{}' satisfies {}", req.name, req.range);
                    let conflict_node = graph.add_node(GraphNode::Conflict(conflict.clone()));
                    graph.add_edge(req_node, conflict_node, GraphEdge::ConflictsWith);
                    failure_description.get_or_insert(conflict);
                }
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        let status = if aborted_reason.is_some() {
            SolveState::Unsolved
        } else if failure_description.is_some() {
            SolveState::Failed
        } else {
            SolveState::Solved
        };

        SolveOutcome {
            status,
            is_partial,
            graph: ResolveGraph(graph),
            solve_time: elapsed,
            load_time: 0.0,
            abort_reason: aborted_reason,
            failure_description,
            resolved: if status == SolveState::Solved { resolved } else { Vec::new() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageRequest;
    use semver::VersionReq;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_package(root: &Path, name: &str, version: &str) {
        let dir = root.join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("package.toml"), "name = \"x\"").unwrap();
    }

    #[test]
    fn picks_highest_satisfying_version() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "foo", "1.0.0");
        write_package(dir.path(), "foo", "2.0.0");
        write_package(dir.path(), "foo", "1.5.0");

        let repo = Arc::new(FilesystemRepoGateway::new());
        let solver = RangeMatchSolver::new(repo);
        let requests = vec![PackageRequest::new("foo", VersionRange::Req(VersionReq::parse("<2.0.0").unwrap()))];
        let paths = vec![dir.path().to_path_buf()];
        let params = SolveParams {
            package_requests: &requests,
            package_paths: &paths,
            timestamp: 0,
            building: false,
            verbosity: false,
            prune_unfailed: false,
            callback: None,
            package_load_callback: None,
        };

        let outcome = solver.solve(&params, 0);
        assert_eq!(outcome.status, SolveState::Solved);
        assert_eq!(outcome.resolved[0].userdata.get("version").unwrap(), "1.5.0");
    }

    #[test]
    fn shallow_depth_reports_partial_and_can_fail_where_deeper_succeeds() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "foo", "3.0.0");
        write_package(dir.path(), "foo", "2.0.0");
        write_package(dir.path(), "foo", "1.0.0");

        let repo = Arc::new(FilesystemRepoGateway::new());
        let solver = RangeMatchSolver::new(repo);
        let requests = vec![PackageRequest::new("foo", VersionRange::Req(VersionReq::parse("=1.0.0").unwrap()))];
        let paths = vec![dir.path().to_path_buf()];
        let params = SolveParams {
            package_requests: &requests,
            package_paths: &paths,
            timestamp: 0,
            building: false,
            verbosity: false,
            prune_unfailed: false,
            callback: None,
            package_load_callback: None,
        };

        // depth=1 only sees 3.0.0, so it cannot find 1.0.0 yet.
        let shallow = solver.solve(&params, 1);
        assert_eq!(shallow.status, SolveState::Failed);
        assert!(shallow.is_partial);

        // depth=0 (unbounded) sees all versions and finds it.
        let deep = solver.solve(&params, 0);
        assert_eq!(deep.status, SolveState::Solved);
        assert!(!deep.is_partial);
    }

    #[test]
    fn missing_package_fails_with_conflict_in_graph() {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(FilesystemRepoGateway::new());
        let solver = RangeMatchSolver::new(repo);
        let requests = vec![PackageRequest::any("nope")];
        let paths = vec![dir.path().to_path_buf()];
        let params = SolveParams {
            package_requests: &requests,
            package_paths: &paths,
            timestamp: 0,
            building: false,
            verbosity: false,
            prune_unfailed: false,
            callback: None,
            package_load_callback: None,
        };

        let outcome = solver.solve(&params, 0);
        assert_eq!(outcome.status, SolveState::Failed);
        assert_eq!(outcome.graph.0.node_count(), 2); // request + conflict
    }

    #[test]
    fn callback_abort_maps_to_unsolved() {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(FilesystemRepoGateway::new());
        let solver = RangeMatchSolver::new(repo);
        let requests = vec![PackageRequest::any("foo")];
        let paths = vec![dir.path().to_path_buf()];
        let abort = || true;
        let params = SolveParams {
            package_requests: &requests,
            package_paths: &paths,
            timestamp: 0,
            building: false,
            verbosity: false,
            prune_unfailed: false,
            callback: Some(&abort),
            package_load_callback: None,
        };

        let outcome = solver.solve(&params, 0);
        assert_eq!(outcome.status, SolveState::Unsolved);
        assert!(outcome.abort_reason.is_some());
    }
}
