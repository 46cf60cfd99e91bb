//! Heat pump study orchestration.
//!
//! Drives a [`hp_solver::NetworkSolver`] through a design point, off-design
//! sweeps, and dataset replay, threading the most recent converged state
//! through consecutive solves as the warm-start seed. Frontends (the CLI)
//! go through [`run_study`]; the controllers are usable directly with any
//! solver implementation.

pub mod design;
pub mod error;
pub mod invoker;
pub mod metrics;
pub mod progress;
pub mod replay;
pub mod seed;
pub mod study;
pub mod sweep;

pub use design::solve_design;
pub use error::{
    AppError, AppResult, CaseFailure, DesignFailure, FailureReason, InvalidStateError,
};
pub use invoker::{SolveOutcome, invoke};
pub use metrics::extract;
pub use progress::{CaseProgress, StudyProgressEvent, StudyStage};
pub use replay::{overlay, run_replay, run_replay_with_progress};
pub use seed::Seed;
pub use study::{
    StudyOptions, StudyPlan, StudyReport, StudyRequest, StudyResponse, StudyService, list_runs,
    load_series, load_study, run_study, run_study_with_progress,
};
pub use sweep::{SweepAxis, SweepRange, run_sweep, run_sweep_with_progress};
