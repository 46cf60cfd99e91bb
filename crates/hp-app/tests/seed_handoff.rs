//! Seed hand-off checked against a scripted solver.

use std::cell::RefCell;
use std::collections::VecDeque;

use hp_app::{
    FailureReason, StudyPlan, StudyProgressEvent, StudyService, StudyStage, SweepAxis, SweepRange,
    extract, run_replay, run_sweep, solve_design,
};
use hp_core::units::{degc, delta_k, kgps, kw};
use hp_graph::Topology;
use hp_project::{DatasetError, DatasetRecord, RecordStream, SinkCondition, SourceCondition};
use hp_results::{CaseId, CaseStatus};
use hp_solver::{
    BoundarySpec, CyclePerformance, NetworkSolver, SecondaryMedium, SinkBoundary,
    SolveDiagnostics, SolveState, SolveStatus, SolverError, SolverResult, SourceBoundary,
};
use proptest::prelude::*;

/// What the scripted solver does on its next call.
enum Step {
    Converge(f64),
    Stall,
    Fail,
}

/// Tag a state through its refrigerant mass flow.
fn state(tag: f64, status: SolveStatus) -> SolveState {
    SolveState::new(
        status,
        Vec::new(),
        CyclePerformance {
            refrigerant_mass_flow: kgps(tag),
            compressor_power: kw(200.0 + tag),
            evaporator_duty: kw(800.0 - tag),
            condenser_duty: kw(1000.0),
            source_mass_flow: kgps(400.0),
            sink_mass_flow: kgps(4.8),
        },
        SolveDiagnostics {
            iterations: 3,
            residual_norm: 1e-9,
        },
    )
}

fn tag(state: &SolveState) -> f64 {
    state.performance().refrigerant_mass_flow.value
}

struct Scripted {
    script: RefCell<VecDeque<Step>>,
    /// Tag of the seed passed on each call.
    seen: RefCell<Vec<Option<f64>>>,
}

impl Scripted {
    fn new(script: Vec<Step>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<Option<f64>> {
        self.seen.borrow().clone()
    }
}

impl NetworkSolver for Scripted {
    fn solve(
        &self,
        _topology: &Topology,
        _spec: &BoundarySpec,
        seed: Option<&SolveState>,
    ) -> SolverResult<SolveState> {
        self.seen.borrow_mut().push(seed.map(tag));
        match self.script.borrow_mut().pop_front() {
            Some(Step::Converge(t)) => Ok(state(t, SolveStatus::Converged)),
            Some(Step::Stall) => Ok(state(-1.0, SolveStatus::NotConverged)),
            Some(Step::Fail) => Err(SolverError::Infeasible {
                what: "scripted".into(),
            }),
            None => panic!("solver called more often than scripted"),
        }
    }
}

fn spec() -> BoundarySpec {
    BoundarySpec::new(
        SourceBoundary {
            medium: SecondaryMedium::Air,
            inlet_temperature: degc(40.0),
            outlet_temperature: degc(10.0),
            cooling: delta_k(2.0),
            nominal_duty: kw(1000.0),
        },
        SinkBoundary {
            medium: SecondaryMedium::Water,
            inlet_temperature: degc(40.0),
            outlet_temperature: degc(90.0),
            duty: kw(1012.0),
        },
        0.85,
    )
}

fn record(timestamp: &str) -> DatasetRecord {
    DatasetRecord {
        timestamp: timestamp.to_string(),
        source: SourceCondition {
            inlet_temperature_c: 40.0,
            outlet_temperature_c: 10.0,
        },
        sink: SinkCondition {
            inlet_temperature_c: 40.0,
            outlet_temperature_c: 90.0,
            duty_kw: 1000.0,
        },
    }
}

#[test]
fn sweep_advances_seed_only_on_convergence() {
    let topology = Topology::heat_pump().unwrap();
    let solver = Scripted::new(vec![
        Step::Converge(1.0),
        Step::Converge(2.0),
        Step::Fail,
        Step::Stall,
        Step::Converge(5.0),
        Step::Converge(6.0),
    ]);
    let design = spec();
    let seed = solve_design(&solver, &topology, &design).unwrap();

    let series = run_sweep(
        &solver,
        &topology,
        &design,
        &seed,
        SweepAxis::ThermalLoadScale,
        &SweepRange::Values(vec![0.2, 0.4, 0.6, 0.8, 1.0]),
    );

    assert_eq!(
        solver.seen(),
        [None, Some(1.0), Some(2.0), Some(2.0), Some(2.0), Some(5.0)]
    );
    let statuses: Vec<_> = series.iter().map(|c| c.status()).collect();
    assert_eq!(
        statuses,
        [
            CaseStatus::Converged,
            CaseStatus::SolverError,
            CaseStatus::NotConverged,
            CaseStatus::Converged,
            CaseStatus::Converged,
        ]
    );
    assert_eq!(
        series.get(2).unwrap().case(),
        &CaseId::Perturbation {
            index: 2,
            value: 0.6
        }
    );
    assert!(series.iter().filter(|c| !c.converged()).all(|c| c.metrics().is_none()));
}

#[test]
fn replay_rejects_malformed_records_before_the_solver() {
    let topology = Topology::heat_pump().unwrap();
    let solver = Scripted::new(vec![
        Step::Converge(1.0),
        Step::Converge(2.0),
        Step::Converge(3.0),
    ]);
    let design = spec();
    let seed = solve_design(&solver, &topology, &design).unwrap();

    let mut bad = record("nan");
    bad.sink.duty_kw = f64::NAN;
    let records: Vec<Result<DatasetRecord, DatasetError>> = vec![
        Ok(record("a")),
        Err(DatasetError::Parse {
            line: 2,
            message: "expected value".into(),
        }),
        Ok(bad),
        Ok(record("d")),
    ];
    let series = run_replay(&solver, &topology, &design, &seed, records);

    assert_eq!(series.len(), 4);
    assert_eq!(solver.seen(), [None, Some(1.0), Some(2.0)]);
    let statuses: Vec<_> = series.iter().map(|c| c.status()).collect();
    assert_eq!(
        statuses,
        [
            CaseStatus::Converged,
            CaseStatus::InvalidInput,
            CaseStatus::InvalidInput,
            CaseStatus::Converged,
        ]
    );
    assert_eq!(
        series.get(1).unwrap().case(),
        &CaseId::Timestep {
            index: 1,
            timestamp: None
        }
    );
    assert_eq!(
        series.get(2).unwrap().case(),
        &CaseId::Timestep {
            index: 2,
            timestamp: Some("nan".into())
        }
    );
}

#[test]
fn design_failures_are_classified() {
    let topology = Topology::heat_pump().unwrap();

    let stalled = Scripted::new(vec![Step::Stall]);
    let err = solve_design(&stalled, &topology, &spec()).unwrap_err();
    assert_eq!(err.reason, FailureReason::NonConvergence);

    let infeasible = Scripted::new(vec![Step::Fail]);
    let err = solve_design(&infeasible, &topology, &spec()).unwrap_err();
    assert_eq!(err.reason, FailureReason::InfeasibleConstraints);
}

fn plan(sweeps: Vec<(SweepAxis, SweepRange)>) -> StudyPlan {
    StudyPlan {
        name: "scripted".into(),
        design: spec(),
        sweeps,
    }
}

#[test]
fn every_axis_starts_from_the_design_seed() {
    let solver = Scripted::new(vec![
        Step::Converge(1.0),
        Step::Converge(2.0),
        Step::Converge(3.0),
        Step::Converge(4.0),
        Step::Converge(5.0),
    ]);
    let service = StudyService::new(solver).unwrap();
    let records: RecordStream = Box::new(vec![Ok::<_, DatasetError>(record("r"))].into_iter());

    let report = service
        .run(
            &plan(vec![
                (
                    SweepAxis::SourceTemperatureShift,
                    SweepRange::Values(vec![-1.0, 0.0]),
                ),
                (SweepAxis::ThermalLoadScale, SweepRange::Values(vec![0.5])),
            ]),
            Some(records),
            None,
        )
        .unwrap();

    assert_eq!(
        service.solver().seen(),
        [None, Some(1.0), Some(2.0), Some(1.0), Some(1.0)]
    );
    assert_eq!(report.sweeps.len(), 2);
    assert_eq!(report.sweeps[0].name(), "source_temperature_shift");
    assert_eq!(report.replay.as_ref().map(|r| r.len()), Some(1));
    assert_eq!(report.series().len(), 4);
}

#[test]
fn design_failure_aborts_the_study() {
    let service = StudyService::new(Scripted::new(vec![Step::Fail])).unwrap();
    let mut events = Vec::new();
    let mut on_event = |e: StudyProgressEvent| events.push(e.stage);

    let err = service
        .run(
            &plan(vec![(
                SweepAxis::ThermalLoadScale,
                SweepRange::Values(vec![0.5, 1.0]),
            )]),
            None,
            Some(&mut on_event),
        )
        .unwrap_err();

    assert_eq!(err.reason, FailureReason::InfeasibleConstraints);
    assert_eq!(service.solver().seen().len(), 1);
    assert_eq!(events, [StudyStage::SolvingDesign]);
}

#[test]
fn progress_reports_each_case() {
    let solver = Scripted::new(vec![
        Step::Converge(1.0),
        Step::Converge(2.0),
        Step::Stall,
    ]);
    let service = StudyService::new(solver).unwrap();
    let mut cases = Vec::new();
    let mut on_event = |e: StudyProgressEvent| {
        if let Some(c) = e.case {
            cases.push((c.index, c.total, c.status));
        }
    };

    service
        .run(
            &plan(vec![(
                SweepAxis::SourceTemperatureShift,
                SweepRange::Values(vec![-2.0, 0.0]),
            )]),
            None,
            Some(&mut on_event),
        )
        .unwrap();

    assert_eq!(
        cases,
        [
            (0, Some(2), CaseStatus::Converged),
            (1, Some(2), CaseStatus::NotConverged),
        ]
    );
}

proptest! {
    #[test]
    fn extract_is_idempotent(t in 0.01f64..100.0) {
        let s = state(t, SolveStatus::Converged);
        let first = extract(&s).unwrap();
        let second = extract(&s).unwrap();
        prop_assert_eq!(first, second);
        prop_assert!((first.cop - first.condenser_duty_w / first.compressor_power_w).abs() < 1e-12);
    }

    #[test]
    fn perturbation_leaves_design_untouched(value in -10.0f64..10.0, scale in 0.01f64..2.0) {
        let design = spec();
        let shifted = SweepAxis::SourceTemperatureShift.perturb(&design, value);
        let scaled = SweepAxis::ThermalLoadScale.perturb(&design, scale);
        prop_assert_eq!(&design, &spec());
        prop_assert_eq!(&shifted, &SweepAxis::SourceTemperatureShift.perturb(&design, value));
        prop_assert_eq!(&scaled.source, &SourceBoundary {
            nominal_duty: design.source.nominal_duty * scale,
            ..design.source.clone()
        });
    }
}
