//! Design-point solve.

use hp_graph::Topology;
use hp_solver::{BoundarySpec, NetworkSolver};

use crate::error::{DesignFailure, FailureReason};
use crate::invoker::{SolveOutcome, invoke};
use crate::seed::Seed;

/// Solve the fully specified design point without a seed.
///
/// The converged state is returned as the first seed of the run. Any failure
/// is fatal: off-design work has nothing to start from.
pub fn solve_design<S: NetworkSolver + ?Sized>(
    solver: &S,
    topology: &Topology,
    design_spec: &BoundarySpec,
) -> Result<Seed, DesignFailure> {
    tracing::info!("solving design point");

    let failure = match invoke(solver, topology, design_spec, None) {
        SolveOutcome::Converged(state) => {
            let d = *state.diagnostics();
            return Seed::from_converged(state)
                .inspect(|_| {
                    tracing::info!(
                        iterations = d.iterations,
                        residual = d.residual_norm,
                        "design point converged"
                    );
                })
                .map_err(|err| DesignFailure {
                    reason: FailureReason::SolverInternal,
                    message: err.to_string(),
                });
        }
        SolveOutcome::NotConverged(state) => DesignFailure {
            reason: FailureReason::NonConvergence,
            message: format!(
                "stopped after {} iterations with residual {:.3e}",
                state.diagnostics().iterations,
                state.diagnostics().residual_norm
            ),
        },
        SolveOutcome::SolverError { reason, message } => DesignFailure { reason, message },
    };

    tracing::error!(reason = %failure.reason, "{}", failure.message);
    Err(failure)
}
