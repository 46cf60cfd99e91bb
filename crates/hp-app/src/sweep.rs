//! Off-design sweeps along one axis at a time.

use std::fmt;

use hp_core::units::delta_k;
use hp_graph::Topology;
use hp_project::{RangeDef, SweepAxisDef};
use hp_results::{CaseId, ResultSeries};
use hp_solver::{BoundarySpec, NetworkSolver};

use crate::invoker::run_case;
use crate::progress::CaseProgress;
use crate::seed::Seed;

/// Quantity perturbed away from the design point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepAxis {
    /// Shift [K] added to both source inlet and outlet temperatures.
    SourceTemperatureShift,
    /// Factor applied to the sink duty and the nominal source duty.
    ThermalLoadScale,
}

impl SweepAxis {
    pub const ALL: [SweepAxis; 2] = [
        SweepAxis::SourceTemperatureShift,
        SweepAxis::ThermalLoadScale,
    ];

    /// Name of the result series produced by a sweep along this axis.
    pub fn as_str(self) -> &'static str {
        match self {
            SweepAxis::SourceTemperatureShift => "source_temperature_shift",
            SweepAxis::ThermalLoadScale => "thermal_load_scale",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Copy of `design` with this axis set to `value`. The input is left untouched.
    pub fn perturb(self, design: &BoundarySpec, value: f64) -> BoundarySpec {
        let mut spec = design.clone();
        match self {
            SweepAxis::SourceTemperatureShift => {
                spec.source.inlet_temperature = spec.source.inlet_temperature + delta_k(value);
                spec.source.outlet_temperature = spec.source.outlet_temperature + delta_k(value);
            }
            SweepAxis::ThermalLoadScale => {
                spec.sink.duty = spec.sink.duty * value;
                spec.source.nominal_duty = spec.source.nominal_duty * value;
            }
        }
        spec
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SweepAxisDef> for SweepAxis {
    fn from(def: SweepAxisDef) -> Self {
        match def {
            SweepAxisDef::SourceTemperatureShift => SweepAxis::SourceTemperatureShift,
            SweepAxisDef::ThermalLoadScale => SweepAxis::ThermalLoadScale,
        }
    }
}

/// Axis values visited by a sweep, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepRange {
    Values(Vec<f64>),
    Linear { start: f64, end: f64, points: usize },
    Logarithmic { start: f64, end: f64, points: usize },
}

impl SweepRange {
    pub fn points(&self) -> Vec<f64> {
        match self {
            SweepRange::Values(values) => values.clone(),
            SweepRange::Linear { start, end, points } => linear(*start, *end, *points),
            SweepRange::Logarithmic { start, end, points } => {
                if *start <= 0.0 || *end <= 0.0 {
                    return linear(*start, *end, *points);
                }
                linear(start.ln(), end.ln(), *points)
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| if i + 1 == *points { *end } else { v.exp() })
                    .collect()
            }
        }
    }
}

fn linear(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let delta = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
            // Ensure exact endpoint
            values[n - 1] = end;
            values
        }
    }
}

impl From<&RangeDef> for SweepRange {
    fn from(def: &RangeDef) -> Self {
        match def {
            RangeDef::Values { values } => SweepRange::Values(values.clone()),
            RangeDef::Linear { start, end, points } => SweepRange::Linear {
                start: *start,
                end: *end,
                points: *points,
            },
            RangeDef::Log { start, end, points } => SweepRange::Logarithmic {
                start: *start,
                end: *end,
                points: *points,
            },
        }
    }
}

/// Sweep one axis starting from the design seed.
pub fn run_sweep<S: NetworkSolver + ?Sized>(
    solver: &S,
    topology: &Topology,
    design_spec: &BoundarySpec,
    design_seed: &Seed,
    axis: SweepAxis,
    range: &SweepRange,
) -> ResultSeries {
    run_sweep_with_progress(solver, topology, design_spec, design_seed, axis, range, None)
}

/// Sweep one axis, reporting each finished step.
///
/// Every step is solved from the most recent converged state. Failed steps
/// are recorded with null metrics and leave the seed where it was.
pub fn run_sweep_with_progress<S: NetworkSolver + ?Sized>(
    solver: &S,
    topology: &Topology,
    design_spec: &BoundarySpec,
    design_seed: &Seed,
    axis: SweepAxis,
    range: &SweepRange,
    mut progress_cb: Option<&mut dyn FnMut(CaseProgress)>,
) -> ResultSeries {
    let values = range.points();
    tracing::info!(%axis, steps = values.len(), "starting sweep");

    let mut seed = design_seed.clone();
    let mut series = ResultSeries::new(axis.as_str());

    for (index, &value) in values.iter().enumerate() {
        let spec = axis.perturb(design_spec, value);
        let result = run_case(
            solver,
            topology,
            &spec,
            &mut seed,
            CaseId::Perturbation { index, value },
        );
        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(CaseProgress {
                index,
                total: Some(values.len()),
                status: result.status(),
            });
        }
        series.push(result);
    }

    let summary = series.summary();
    tracing::info!(
        %axis,
        converged = summary.converged,
        failed = summary.failed(),
        "sweep finished"
    );
    series
}
