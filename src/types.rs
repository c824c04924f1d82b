//! Core data model: requests, variants, opaque handles, and the cached
//! resolve payload shape.
//!
//! Every type here is plain data — no I/O, no trait objects — so that the
//! cache protocol, key builder, and solver adapter can all serialize and
//! compare it without depending on any particular gateway implementation.

use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A version constraint on a single package request.
///
/// `Any` is the universal range (no constraint) and renders as `"any"`,
/// matching how an unconstrained request is displayed back to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VersionRange {
    Any,
    Req(VersionReq),
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Req(req) => write!(f, "{req}"),
        }
    }
}

/// `(name, version_range)`. Identity and equality are both the rendered
/// string form (`name-range`, or bare `name` for `any`): two requests that
/// render identically are the same request even if their internal
/// `VersionReq` representations differ syntactically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRequest {
    pub name: String,
    pub range: VersionRange,
}

impl PackageRequest {
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, VersionRange::Any)
    }

    /// Parses `name` or `name-range` the way a request is typically written
    /// on a command line (e.g. `"python-3.10"`, `"maya"`).
    pub fn parse(spec: &str) -> Result<Self, semver::Error> {
        match spec.split_once('-') {
            Some((name, range)) => {
                let req = VersionReq::parse(range)?;
                Ok(Self::new(name, VersionRange::Req(req)))
            }
            None => Ok(Self::any(spec)),
        }
    }
}

impl fmt::Display for PackageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            VersionRange::Any => write!(f, "{}", self.name),
            VersionRange::Req(req) => write!(f, "{}-{}", self.name, req),
        }
    }
}

impl PartialEq for PackageRequest {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
impl Eq for PackageRequest {}

/// Opaque nested key/value payload produced by the solver and accepted by
/// the repository layer to re-materialize a specific variant. Treated as an
/// inert blob by everything except the repository gateway that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantHandle(serde_json::Map<String, serde_json::Value>);

impl VariantHandle {
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// The package name this handle resolves to, if the field is present.
    ///
    /// The handle is opaque in general, but every handle this crate's own
    /// solver/repository implementations produce carries a `name` field, so
    /// the cache protocol can group handles by package name without fully
    /// materializing them.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(serde_json::Value::as_str)
    }
}

/// A value that changes iff a variant's on-disk definition changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStateHandle(pub String);

impl fmt::Display for VariantStateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Points at the on-disk resource a repository needs in order to compute a
/// [`VariantStateHandle`] or re-read a variant's definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantResource {
    pub repository_id: String,
    pub definition_path: PathBuf,
}

/// A materialized package variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub qualified_name: String,
    pub resource: VariantResource,
}

/// Closed set of resolve outcomes, each with a human-readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverStatus {
    Pending,
    Solved,
    Failed,
    Aborted,
}

impl ResolverStatus {
    pub fn description(self) -> &'static str {
        match self {
            Self::Pending => "The resolve has not yet started.",
            Self::Solved => "The resolve has completed successfully.",
            Self::Failed => "The resolve is not possible.",
            Self::Aborted => "The resolve was stopped by the user (via callback).",
        }
    }
}

impl fmt::Display for ResolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Solved => "solved",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// A node in the resolve graph: a request, a chosen variant, or a conflict
/// encountered along the way. Kept deliberately small — the graph exists so
/// callers can inspect *why* a resolve succeeded or failed, not to carry the
/// full solver trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphNode {
    Request(String),
    Variant { name: String, version: String },
    Conflict(String),
}

/// Edge label connecting graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphEdge {
    Requires,
    ConflictsWith,
}

/// The resolve graph: a directed representation of the decisions and
/// conflicts the solver encountered, present for both successful and failed
/// resolves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveGraph(pub petgraph::graph::DiGraph<GraphNode, GraphEdge>);

impl PartialEq for ResolveGraph {
    fn eq(&self, other: &Self) -> bool {
        // petgraph's DiGraph has no structural PartialEq; compare the node
        // and edge multisets, which is all the cache protocol ever needs.
        let nodes: Vec<_> = self.0.raw_nodes().iter().map(|n| &n.weight).collect();
        let other_nodes: Vec<_> = other.0.raw_nodes().iter().map(|n| &n.weight).collect();
        nodes == other_nodes && self.0.edge_count() == other.0.edge_count()
    }
}

/// The normalized result of one solver invocation, independent of whether it
/// came from a live solve or a cache hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverDict {
    pub status: ResolverStatus,
    pub graph: ResolveGraph,
    pub solve_time: f64,
    pub load_time: f64,
    pub failure_description: Option<String>,
    pub variant_handles: Vec<VariantHandle>,
}

impl SolverDict {
    /// A `pending`-shaped dict used only as a placeholder before the first
    /// `solve()`; never observed by callers.
    pub fn pending() -> Self {
        Self {
            status: ResolverStatus::Pending,
            graph: ResolveGraph::default(),
            solve_time: 0.0,
            load_time: 0.0,
            failure_description: None,
            variant_handles: Vec::new(),
        }
    }
}

/// The cached payload: a solved `solver_dict` plus the repository state it
/// was computed against, so a later caller can tell whether it is still
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub solver_dict: SolverDict,
    pub release_times: BTreeMap<String, u64>,
    pub variant_states: BTreeMap<String, VariantStateHandle>,
}
