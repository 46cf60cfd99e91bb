//! Capability interface of the nonlinear network solver.

use hp_graph::Topology;

use crate::error::SolverResult;
use crate::spec::BoundarySpec;
use crate::state::SolveState;

/// Something that can solve the heat pump network for one boundary specification.
///
/// Returns `Ok` with a [`SolveState`] flagged converged or not converged when
/// an iterate could be produced, and `Err` when the solve could not run at all
/// (infeasible constraints, property failures at the start point, numerical
/// breakdown). Implementations must not keep state between calls.
pub trait NetworkSolver {
    fn solve(
        &self,
        topology: &Topology,
        spec: &BoundarySpec,
        seed: Option<&SolveState>,
    ) -> SolverResult<SolveState>;
}

impl<S: NetworkSolver + ?Sized> NetworkSolver for &S {
    fn solve(
        &self,
        topology: &Topology,
        spec: &BoundarySpec,
        seed: Option<&SolveState>,
    ) -> SolverResult<SolveState> {
        (**self).solve(topology, spec, seed)
    }
}
