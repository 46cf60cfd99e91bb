//! Error types for the hp-app orchestration layer.

use std::fmt;
use std::path::PathBuf;

use hp_results::{CaseId, CaseResult};
use hp_solver::{SolveStatus, SolverError};
use serde::{Deserialize, Serialize};

/// Why a solve attempt produced no usable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NonConvergence,
    InfeasibleConstraints,
    SolverInternal,
}

impl FailureReason {
    /// Classify a raised solver error.
    pub fn classify(err: &SolverError) -> Self {
        match err {
            SolverError::Infeasible { .. } => FailureReason::InfeasibleConstraints,
            SolverError::ConvergenceFailed { .. } => FailureReason::NonConvergence,
            _ => FailureReason::SolverInternal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::NonConvergence => "non-convergence",
            FailureReason::InfeasibleConstraints => "infeasible constraint set",
            FailureReason::SolverInternal => "solver internal error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The design point could not be solved. Fatal to the whole run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("design point failed ({reason}): {message}")]
pub struct DesignFailure {
    pub reason: FailureReason,
    pub message: String,
}

/// A single off-design or replay case failed.
///
/// Never escapes a controller: it is turned into a [`CaseResult`] with null
/// metrics and the run continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaseFailure {
    #[error("not converged after {iterations} iterations (residual {residual_norm:.3e})")]
    NotConverged {
        iterations: usize,
        residual_norm: f64,
    },

    #[error("{reason}: {message}")]
    Solver {
        reason: FailureReason,
        message: String,
    },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl CaseFailure {
    pub fn into_result(self, case: CaseId) -> CaseResult {
        let message = self.to_string();
        match self {
            CaseFailure::NotConverged { .. } => CaseResult::not_converged(case, message),
            CaseFailure::Solver { .. } => CaseResult::solver_error(case, message),
            CaseFailure::InvalidInput { .. } => CaseResult::invalid_input(case, message),
        }
    }
}

/// A state was used in a way its convergence status does not allow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidStateError {
    #[error("solve state is {status:?}, expected Converged")]
    NotConverged { status: SolveStatus },

    #[error("solve state is not physical: {what}")]
    NonPhysical { what: String },
}

/// Application error type shared by the CLI and tests.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read study file: {path}")]
    StudyFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Topology error: {0}")]
    Topology(String),

    #[error(transparent)]
    Design(#[from] DesignFailure),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hp-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hp_project::ProjectError> for AppError {
    fn from(err: hp_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<hp_results::ResultsError> for AppError {
    fn from(err: hp_results::ResultsError) -> Self {
        match err {
            hp_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<hp_graph::GraphError> for AppError {
    fn from(err: hp_graph::GraphError) -> Self {
        AppError::Topology(err.to_string())
    }
}
