//! Steady-state network solver for the heat pump cycle.
//!
//! The solver is reached only through the [`NetworkSolver`] trait: topology +
//! boundary specification + optional seed in, [`SolveState`] (converged or
//! not) or a [`SolverError`] out. [`CycleSolver`] is the Newton-based
//! implementation over any [`hp_fluids::FluidModel`].

pub mod cycle;
pub mod error;
pub mod jacobian;
pub mod network;
pub mod newton;
pub mod spec;
pub mod state;

pub use cycle::CycleSolver;
pub use error::{SolverError, SolverResult};
pub use network::NetworkSolver;
pub use newton::{NewtonConfig, NewtonResult};
pub use spec::{BoundarySpec, SecondaryMedium, SinkBoundary, SourceBoundary};
pub use state::{CyclePerformance, NodeState, SolveDiagnostics, SolveState, SolveStatus};
