//! Normalizes a solver's raw output into the resolver's `SolverDict`
//! vocabulary via a fixed status-mapping table.

use super::{SolveParams, SolveState, Solver};
use crate::types::{ResolverStatus, SolverDict};

/// Wraps a concrete [`Solver`] and projects its output into a [`SolverDict`].
pub struct SolverAdapter<S> {
    solver: S,
}

impl<S: Solver> SolverAdapter<S> {
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Runs one invocation at `depth` and returns the normalized dict plus
    /// whether the solver reported a partial exploration (the iterative
    /// driver's escalation signal — not part of `SolverDict` itself, since
    /// a cached/applied dict never needs it again).
    pub fn invoke(&self, params: &SolveParams<'_>, depth: u32) -> (SolverDict, bool) {
        let outcome = self.solver.solve(params, depth);

        let (status, failure_description, variant_handles) = match outcome.status {
            SolveState::Unsolved => (ResolverStatus::Aborted, outcome.abort_reason, Vec::new()),
            SolveState::Failed => (ResolverStatus::Failed, outcome.failure_description, Vec::new()),
            SolveState::Solved => (
                ResolverStatus::Solved,
                None,
                outcome.resolved.into_iter().map(|r| r.userdata).collect(),
            ),
        };

        let dict = SolverDict {
            status,
            graph: outcome.graph,
            solve_time: outcome.solve_time,
            load_time: outcome.load_time,
            failure_description,
            variant_handles,
        };
        (dict, outcome.is_partial)
    }
}
