//! Solution state of a single cycle solve.

use hp_core::NodeId;
use hp_core::units::{MassRate, Power};
use hp_fluids::ThermoState;
use serde::{Deserialize, Serialize};

/// Outcome flag carried by a [`SolveState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    NotConverged,
}

/// Working-fluid state at one connection of the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub node: NodeId,
    pub name: String,
    pub state: ThermoState,
}

/// Flows and energy rates of the cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePerformance {
    pub refrigerant_mass_flow: MassRate,
    pub compressor_power: Power,
    pub evaporator_duty: Power,
    pub condenser_duty: Power,
    pub source_mass_flow: MassRate,
    pub sink_mass_flow: MassRate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveDiagnostics {
    pub iterations: usize,
    pub residual_norm: f64,
}

/// A converged or attempted network solution.
///
/// Holds everything needed to report metrics and to warm-start the next solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveState {
    status: SolveStatus,
    /// Loop connections in flow order (cycle closer inlet first).
    nodes: Vec<NodeState>,
    performance: CyclePerformance,
    diagnostics: SolveDiagnostics,
}

impl SolveState {
    pub fn new(
        status: SolveStatus,
        nodes: Vec<NodeState>,
        performance: CyclePerformance,
        diagnostics: SolveDiagnostics,
    ) -> Self {
        Self {
            status,
            nodes,
            performance,
            diagnostics,
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.iter().find(|n| n.node == id)
    }

    pub fn performance(&self) -> &CyclePerformance {
        &self.performance
    }

    pub fn diagnostics(&self) -> &SolveDiagnostics {
        &self.diagnostics
    }
}
