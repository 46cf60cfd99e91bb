//! Result data types.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Identifies one solve within a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseId {
    Design,
    /// Step `index` of a sweep, at axis value `value`.
    Perturbation { index: usize, value: f64 },
    /// Record `index` of a replayed dataset.
    Timestep {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseId::Design => f.write_str("design"),
            CaseId::Perturbation { index, value } => write!(f, "step {index} ({value})"),
            CaseId::Timestep {
                index,
                timestamp: Some(ts),
            } => write!(f, "record {index} @ {ts}"),
            CaseId::Timestep {
                index,
                timestamp: None,
            } => write!(f, "record {index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Converged,
    NotConverged,
    SolverError,
    /// Rejected before reaching the solver.
    InvalidInput,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Converged => "converged",
            CaseStatus::NotConverged => "not_converged",
            CaseStatus::SolverError => "solver_error",
            CaseStatus::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performance figures of one converged case (SI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cop: f64,
    pub compressor_power_w: f64,
    pub evaporator_duty_w: f64,
    pub condenser_duty_w: f64,
}

/// Outcome of one case. Metrics are present exactly when the case converged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    case: CaseId,
    status: CaseStatus,
    metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CaseResult {
    pub fn success(case: CaseId, metrics: Metrics) -> Self {
        Self {
            case,
            status: CaseStatus::Converged,
            metrics: Some(metrics),
            message: None,
        }
    }

    pub fn not_converged(case: CaseId, message: impl Into<String>) -> Self {
        Self::failure(case, CaseStatus::NotConverged, message.into())
    }

    pub fn solver_error(case: CaseId, message: impl Into<String>) -> Self {
        Self::failure(case, CaseStatus::SolverError, message.into())
    }

    pub fn invalid_input(case: CaseId, message: impl Into<String>) -> Self {
        Self::failure(case, CaseStatus::InvalidInput, message.into())
    }

    fn failure(case: CaseId, status: CaseStatus, message: String) -> Self {
        Self {
            case,
            status,
            metrics: None,
            message: Some(message),
        }
    }

    pub fn case(&self) -> &CaseId {
        &self.case
    }

    pub fn status(&self) -> CaseStatus {
        self.status
    }

    pub fn converged(&self) -> bool {
        self.status == CaseStatus::Converged
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Failure detail, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub name: String,
    pub cases: usize,
    pub converged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub study_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub series: Vec<SeriesEntry>,
}
