//! The constraint solver contract and the adapter that normalizes a
//! solver's output into the resolver's own vocabulary.
//!
//! The solver itself is an external collaborator, out of scope for this
//! crate: this module defines the port ([`Solver`]) the rest of the crate
//! depends on, plus one
//! reference implementation ([`reference::RangeMatchSolver`]) so the
//! adapter boundary is exercised against something real rather than a mock.

mod adapter;
pub mod reference;

pub use adapter::SolverAdapter;

use crate::types::{PackageRequest, ResolveGraph, VariantHandle};
use std::path::PathBuf;

/// Parameters for one solver invocation, independent of the depth it runs
/// at (depth is threaded separately so the iterative driver can reuse the
/// same params across escalating depths).
pub struct SolveParams<'a> {
    pub package_requests: &'a [PackageRequest],
    pub package_paths: &'a [PathBuf],
    pub timestamp: u64,
    pub building: bool,
    pub verbosity: bool,
    pub prune_unfailed: bool,
    /// Polled by the solver; returning `true` aborts the solve.
    pub callback: Option<&'a dyn Fn() -> bool>,
    /// Invoked once per package name before it is loaded.
    pub package_load_callback: Option<&'a dyn Fn(&str)>,
}

/// Raw solver status, prior to normalization into [`crate::types::ResolverStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Unsolved,
    Failed,
    Solved,
}

/// One resolved package as the solver reports it: an opaque handle the
/// repository layer can re-materialize.
pub struct ResolvedSolverVariant {
    pub userdata: VariantHandle,
}

/// Everything the solver reports after `solve()`.
pub struct SolveOutcome {
    pub status: SolveState,
    /// True if the depth cap prevented exhaustive exploration at this
    /// invocation — the iterative driver's escalation signal.
    pub is_partial: bool,
    pub graph: ResolveGraph,
    pub solve_time: f64,
    pub load_time: f64,
    pub abort_reason: Option<String>,
    pub failure_description: Option<String>,
    pub resolved: Vec<ResolvedSolverVariant>,
}

/// The constraint solver port. `depth` caps how many versions of any single
/// package name the solver may load; `0` means unbounded.
pub trait Solver {
    fn solve(&self, params: &SolveParams<'_>, depth: u32) -> SolveOutcome;
}
