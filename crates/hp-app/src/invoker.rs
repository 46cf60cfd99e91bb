//! Single solve attempt and its classification.

use hp_graph::Topology;
use hp_results::{CaseId, CaseResult};
use hp_solver::{BoundarySpec, NetworkSolver, SolveState, SolveStatus};

use crate::error::{CaseFailure, FailureReason};
use crate::metrics;
use crate::seed::Seed;

/// Classified result of one solver call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Converged(SolveState),
    /// The solver ran but stopped short of its tolerance.
    NotConverged(SolveState),
    /// The solver raised instead of producing a state.
    SolverError {
        reason: FailureReason,
        message: String,
    },
}

impl SolveOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveOutcome::Converged(_))
    }
}

/// Run the solver once. Has no effect beyond the solver call itself.
pub fn invoke<S: NetworkSolver + ?Sized>(
    solver: &S,
    topology: &Topology,
    spec: &BoundarySpec,
    seed: Option<&Seed>,
) -> SolveOutcome {
    match solver.solve(topology, spec, seed.map(Seed::state)) {
        Ok(state) => match state.status() {
            SolveStatus::Converged => SolveOutcome::Converged(state),
            SolveStatus::NotConverged => SolveOutcome::NotConverged(state),
        },
        Err(err) => SolveOutcome::SolverError {
            reason: FailureReason::classify(&err),
            message: err.to_string(),
        },
    }
}

/// Solve one seeded case and record it.
///
/// The seed moves to the new state only when the case converged.
pub(crate) fn run_case<S: NetworkSolver + ?Sized>(
    solver: &S,
    topology: &Topology,
    spec: &BoundarySpec,
    seed: &mut Seed,
    case: CaseId,
) -> CaseResult {
    let failure = match invoke(solver, topology, spec, Some(seed)) {
        SolveOutcome::Converged(state) => match metrics::extract(&state) {
            Ok(m) => {
                tracing::debug!(%case, cop = m.cop, "case converged");
                if let Ok(next) = Seed::from_converged(state) {
                    *seed = next;
                }
                return CaseResult::success(case, m);
            }
            Err(err) => CaseFailure::Solver {
                reason: FailureReason::SolverInternal,
                message: err.to_string(),
            },
        },
        SolveOutcome::NotConverged(state) => CaseFailure::NotConverged {
            iterations: state.diagnostics().iterations,
            residual_norm: state.diagnostics().residual_norm,
        },
        SolveOutcome::SolverError { reason, message } => CaseFailure::Solver { reason, message },
    };

    tracing::warn!(%case, "case failed: {failure}");
    failure.into_result(case)
}
