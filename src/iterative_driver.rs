//! Depth-doubling loop around the solver.
//!
//! Approximates breadth-first exploration: newer package versions are
//! loaded first, older ones deferred, so the common case (the requested
//! range is satisfied by a recent release) terminates after one or two
//! shallow solves instead of loading a package's entire history up front.

use crate::solver::{SolveParams, Solver, SolverAdapter};
use crate::types::{ResolverStatus, SolverDict};
use tracing::info;

/// One solver invocation's outcome, kept for diagnostics: not required by
/// any caller, but useful the same way this codebase's other iterative
/// algorithms expose a step history.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub depth: u32,
    pub status: ResolverStatus,
    pub is_partial: bool,
}

pub struct IterativeDriver<'s, S> {
    adapter: &'s SolverAdapter<S>,
}

impl<'s, S: Solver> IterativeDriver<'s, S> {
    pub fn new(adapter: &'s SolverAdapter<S>) -> Self {
        Self { adapter }
    }

    /// Runs the driver in one of its three modes (single unbounded solve,
    /// single capped solve, or iterative depth-doubling). Returns the final
    /// `SolverDict` plus a record of every invocation made.
    pub fn run(
        &self,
        params: &SolveParams<'_>,
        start_depth: u32,
        max_depth: u32,
    ) -> (SolverDict, Vec<IterationRecord>) {
        let mut history = Vec::new();

        if start_depth == 0 {
            // One solve, capped at max_depth (0 = unbounded).
            let (dict, is_partial) = self.adapter.invoke(params, max_depth);
            history.push(IterationRecord {
                depth: max_depth,
                status: dict.status,
                is_partial,
            });
            return (dict, history);
        }

        let mut depth = start_depth;
        loop {
            info!(depth, "invoking solver at depth");
            let (dict, is_partial) = self.adapter.invoke(params, depth);
            history.push(IterationRecord {
                depth,
                status: dict.status,
                is_partial,
            });

            if dict.status == ResolverStatus::Solved {
                return (dict, history);
            }
            if !is_partial {
                return (dict, history);
            }
            if max_depth > 0 && depth >= max_depth {
                return (dict, history);
            }

            depth = if max_depth > 0 {
                (depth.saturating_mul(2)).min(max_depth)
            } else {
                depth.saturating_mul(2)
            };
        }
    }
}
