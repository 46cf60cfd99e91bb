//! Dataset replay: one seeded solve per recorded operating condition.

use hp_core::units::{degc, kw};
use hp_graph::Topology;
use hp_project::{DatasetRecord, DatasetResult};
use hp_results::{CaseId, CaseResult, ResultSeries};
use hp_solver::{BoundarySpec, NetworkSolver};

use crate::error::CaseFailure;
use crate::invoker::run_case;
use crate::progress::CaseProgress;
use crate::seed::Seed;

/// Series name of a replay.
pub const REPLAY_SERIES: &str = "replay";

/// Boundary specification for one record.
///
/// The record supplies the source and sink temperatures and the sink duty.
/// Everything else (media, efficiency, TTDs, qualities, source cooling and
/// nominal duty) comes from the design specification.
pub fn overlay(design: &BoundarySpec, record: &DatasetRecord) -> BoundarySpec {
    let mut spec = design.clone();
    spec.source.inlet_temperature = degc(record.source.inlet_temperature_c);
    spec.source.outlet_temperature = degc(record.source.outlet_temperature_c);
    spec.sink.inlet_temperature = degc(record.sink.inlet_temperature_c);
    spec.sink.outlet_temperature = degc(record.sink.outlet_temperature_c);
    spec.sink.duty = kw(record.sink.duty_kw);
    spec
}

/// Replay records in order, starting from the design seed.
pub fn run_replay<S, I>(
    solver: &S,
    topology: &Topology,
    design_spec: &BoundarySpec,
    design_seed: &Seed,
    records: I,
) -> ResultSeries
where
    S: NetworkSolver + ?Sized,
    I: IntoIterator<Item = DatasetResult<DatasetRecord>>,
{
    run_replay_with_progress(solver, topology, design_spec, design_seed, records, None)
}

/// Replay records in order, reporting each finished record.
///
/// Records are pulled one at a time. A record that failed to parse or holds
/// non-finite values never reaches the solver: it is recorded as invalid
/// input and, like any failed case, leaves the seed unchanged. The series has
/// exactly one entry per record.
pub fn run_replay_with_progress<S, I>(
    solver: &S,
    topology: &Topology,
    design_spec: &BoundarySpec,
    design_seed: &Seed,
    records: I,
    mut progress_cb: Option<&mut dyn FnMut(CaseProgress)>,
) -> ResultSeries
where
    S: NetworkSolver + ?Sized,
    I: IntoIterator<Item = DatasetResult<DatasetRecord>>,
{
    tracing::info!("starting dataset replay");

    let mut seed = design_seed.clone();
    let mut series = ResultSeries::new(REPLAY_SERIES);

    for (index, record) in records.into_iter().enumerate() {
        let result = match record {
            Ok(record) => {
                let case = CaseId::Timestep {
                    index,
                    timestamp: Some(record.timestamp.clone()),
                };
                match record.check_finite() {
                    Ok(()) => {
                        let spec = overlay(design_spec, &record);
                        run_case(solver, topology, &spec, &mut seed, case)
                    }
                    Err(err) => rejected(case, err.to_string()),
                }
            }
            Err(err) => rejected(
                CaseId::Timestep {
                    index,
                    timestamp: None,
                },
                err.to_string(),
            ),
        };

        if let Some(cb) = progress_cb.as_deref_mut() {
            cb(CaseProgress {
                index,
                total: None,
                status: result.status(),
            });
        }
        series.push(result);
    }

    let summary = series.summary();
    tracing::info!(
        records = summary.total,
        converged = summary.converged,
        failed = summary.failed(),
        "replay finished"
    );
    series
}

fn rejected(case: CaseId, message: String) -> CaseResult {
    tracing::warn!(%case, "record rejected: {message}");
    CaseFailure::InvalidInput { message }.into_result(case)
}
