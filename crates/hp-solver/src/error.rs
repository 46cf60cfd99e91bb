//! Error types for solver operations.

use hp_core::HpError;
use hp_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur while solving the cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    /// The boundary specification cannot be satisfied by any cycle state.
    #[error("Infeasible constraints: {what}")]
    Infeasible { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for HpError {
    fn from(e: SolverError) -> Self {
        HpError::Invariant {
            what: format!("solver: {e}"),
        }
    }
}
