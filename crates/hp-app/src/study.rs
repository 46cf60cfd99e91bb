//! Study execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use hp_fluids::WaterModel;
use hp_graph::Topology;
use hp_project::{DatasetSourceDef, RecordStream, Study, WorkingFluidDef};
use hp_results::{CaseId, CaseResult, Metrics, ResultSeries, RunManifest, RunStore};
use hp_solver::{BoundarySpec, CycleSolver, NetworkSolver, NewtonConfig, SolveState};
use serde::Serialize;

use crate::error::{AppError, AppResult, DesignFailure, FailureReason};
use crate::metrics;
use crate::progress::{CaseProgress, StudyProgressEvent, StudyStage};
use crate::replay::{REPLAY_SERIES, run_replay_with_progress};
use crate::sweep::{SweepAxis, SweepRange, run_sweep_with_progress};
use crate::{design, seed::Seed};

/// Series name of the design point.
pub const DESIGN_SERIES: &str = "design";

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(StudyProgressEvent)>;

/// What a study run solves, in solver units.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub name: String,
    pub design: BoundarySpec,
    pub sweeps: Vec<(SweepAxis, SweepRange)>,
}

impl StudyPlan {
    /// Plan for a study file. `axes` restricts the sweeps to the listed axes;
    /// asking for an axis the study does not define is an error.
    pub fn from_study(study: &Study, axes: Option<&[SweepAxis]>) -> AppResult<Self> {
        let defined: Vec<(SweepAxis, SweepRange)> = study
            .sweeps
            .iter()
            .map(|s| (SweepAxis::from(s.axis), SweepRange::from(&s.range)))
            .collect();

        let sweeps = match axes {
            None => defined,
            Some(axes) => {
                if let Some(missing) = axes
                    .iter()
                    .find(|a| !defined.iter().any(|(d, _)| d == *a))
                {
                    return Err(AppError::InvalidInput(format!(
                        "study '{}' defines no sweep along {missing}",
                        study.name
                    )));
                }
                defined
                    .into_iter()
                    .filter(|(axis, _)| axes.contains(axis))
                    .collect()
            }
        };

        Ok(Self {
            name: study.name.clone(),
            design: BoundarySpec::from(&study.design),
            sweeps,
        })
    }
}

/// Everything a study run produced.
#[derive(Debug, Clone)]
pub struct StudyReport {
    pub study_name: String,
    pub design: Metrics,
    /// Full design state; absent when the report was loaded from the cache.
    pub design_state: Option<SolveState>,
    pub sweeps: Vec<ResultSeries>,
    pub replay: Option<ResultSeries>,
}

impl StudyReport {
    /// All series in storage order: design, sweeps, replay.
    pub fn series(&self) -> Vec<ResultSeries> {
        let mut design = ResultSeries::new(DESIGN_SERIES);
        design.push(CaseResult::success(CaseId::Design, self.design));

        let mut all = vec![design];
        all.extend(self.sweeps.iter().cloned());
        all.extend(self.replay.iter().cloned());
        all
    }

    /// Rebuild a report from stored series.
    pub fn from_series(study_name: &str, series: Vec<ResultSeries>) -> AppResult<Self> {
        let mut design = None;
        let mut sweeps = Vec::new();
        let mut replay = None;

        for s in series {
            let name = s.name().to_string();
            match name.as_str() {
                DESIGN_SERIES => design = s.get(0).and_then(|c| c.metrics()).copied(),
                REPLAY_SERIES => replay = Some(s),
                _ => sweeps.push(s),
            }
        }

        let design = design.ok_or_else(|| {
            AppError::Results(format!("run of '{study_name}' has no converged design point"))
        })?;

        Ok(Self {
            study_name: study_name.to_string(),
            design,
            design_state: None,
            sweeps,
            replay,
        })
    }
}

/// Runs a study plan against one solver.
pub struct StudyService<S> {
    solver: S,
    topology: Topology,
}

impl<S: NetworkSolver> StudyService<S> {
    /// Service over the standard five-component heat pump loop.
    pub fn new(solver: S) -> AppResult<Self> {
        Ok(Self::with_topology(solver, Topology::heat_pump()?))
    }

    pub fn with_topology(solver: S, topology: Topology) -> Self {
        Self { solver, topology }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Design point, then every planned sweep, then the replay if records are given.
    ///
    /// Only a design failure stops the run; failed sweep or replay cases are
    /// recorded in their series.
    pub fn run(
        &self,
        plan: &StudyPlan,
        records: Option<RecordStream>,
        mut progress_cb: ProgressCallback<'_>,
    ) -> Result<StudyReport, DesignFailure> {
        self.run_inner(plan, records, &mut progress_cb, Instant::now())
    }

    fn run_inner(
        &self,
        plan: &StudyPlan,
        records: Option<RecordStream>,
        progress_cb: &mut ProgressCallback<'_>,
        started: Instant,
    ) -> Result<StudyReport, DesignFailure> {
        tracing::info!(study = %plan.name, sweeps = plan.sweeps.len(), "running study");

        emit(
            progress_cb,
            StudyStage::SolvingDesign,
            started,
            Some("Solving design point".to_string()),
            None,
        );
        let seed = design::solve_design(&self.solver, &self.topology, &plan.design)?;
        let design = design_metrics(&seed)?;

        let mut sweeps = Vec::with_capacity(plan.sweeps.len());
        for (axis, range) in &plan.sweeps {
            let axis = *axis;
            emit(
                progress_cb,
                StudyStage::Sweeping { axis },
                started,
                Some(format!("Sweeping {axis}")),
                None,
            );
            let mut on_case = |case: CaseProgress| {
                emit(
                    progress_cb,
                    StudyStage::Sweeping { axis },
                    started,
                    None,
                    Some(case),
                )
            };
            sweeps.push(run_sweep_with_progress(
                &self.solver,
                &self.topology,
                &plan.design,
                &seed,
                axis,
                range,
                Some(&mut on_case),
            ));
        }

        let replay = records.map(|records| {
            emit(
                progress_cb,
                StudyStage::Replaying,
                started,
                Some("Replaying dataset".to_string()),
                None,
            );
            let mut on_case = |case: CaseProgress| {
                emit(progress_cb, StudyStage::Replaying, started, None, Some(case))
            };
            run_replay_with_progress(
                &self.solver,
                &self.topology,
                &plan.design,
                &seed,
                records,
                Some(&mut on_case),
            )
        });

        Ok(StudyReport {
            study_name: plan.name.clone(),
            design,
            design_state: Some(seed.into_state()),
            sweeps,
            replay,
        })
    }
}

fn design_metrics(seed: &Seed) -> Result<Metrics, DesignFailure> {
    metrics::extract(seed.state()).map_err(|err| DesignFailure {
        reason: FailureReason::SolverInternal,
        message: err.to_string(),
    })
}

fn emit(
    progress_cb: &mut ProgressCallback<'_>,
    stage: StudyStage,
    started: Instant,
    message: Option<String>,
    case: Option<CaseProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(StudyProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            case,
        });
    }
}

/// Options for running a study file.
#[derive(Debug, Clone)]
pub struct StudyOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Sweep only these axes; `None` runs every sweep in the study.
    pub axes: Option<Vec<SweepAxis>>,
    pub replay: bool,
    /// Dataset replacing the one named in the study file.
    pub dataset: Option<PathBuf>,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            axes: None,
            replay: true,
            dataset: None,
        }
    }
}

/// Request to run a study file.
pub struct StudyRequest<'a> {
    pub study_path: &'a Path,
    pub options: StudyOptions,
}

/// Response from a study run.
#[derive(Debug, Clone)]
pub struct StudyResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub report: StudyReport,
    pub loaded_from_cache: bool,
}

/// Inputs that identify a run in the cache.
#[derive(Serialize)]
struct RunKey<'a> {
    study: &'a Study,
    axes: Vec<&'static str>,
    replay: bool,
    dataset: Option<DatasetKey>,
}

/// Replay dataset read from disk, identified by location and content.
#[derive(Serialize)]
struct DatasetKey {
    path: PathBuf,
    sha256: String,
}

impl DatasetKey {
    /// Key of the file a replay would read; `None` for inline records or no replay.
    fn for_replay(
        study: &Study,
        study_path: &Path,
        options: &StudyOptions,
    ) -> AppResult<Option<Self>> {
        if !options.replay {
            return Ok(None);
        }
        let path = match (&options.dataset, &study.replay) {
            (Some(path), _) => path.clone(),
            (None, Some(replay)) => match &replay.dataset {
                DatasetSourceDef::File { path } => {
                    hp_project::resolve_dataset_path(study_path, path)
                }
                DatasetSourceDef::Inline { .. } => return Ok(None),
            },
            (None, None) => return Ok(None),
        };
        let sha256 = hp_results::digest_file(&path)?;
        Ok(Some(Self { path, sha256 }))
    }
}

/// Execute or load a study run.
pub fn run_study(request: &StudyRequest) -> AppResult<StudyResponse> {
    run_study_with_progress(request, None)
}

/// Execute or load a study run and stream progress events.
pub fn run_study_with_progress(
    request: &StudyRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<StudyResponse> {
    let started = Instant::now();
    let options = &request.options;

    emit(
        &mut progress_cb,
        StudyStage::LoadingStudy,
        started,
        Some("Loading study".to_string()),
        None,
    );
    let study = hp_project::load_study(request.study_path)?;
    let plan = StudyPlan::from_study(&study, options.axes.as_deref())?;

    emit(
        &mut progress_cb,
        StudyStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );
    let key = RunKey {
        study: &study,
        axes: plan.sweeps.iter().map(|(a, _)| a.as_str()).collect(),
        replay: options.replay,
        dataset: DatasetKey::for_replay(&study, request.study_path, options)?,
    };
    let run_id = hp_results::compute_run_id(&key, &options.solver_version)?;
    let store = RunStore::for_study(request.study_path)?;

    if options.use_cache && store.has_run(&run_id) {
        emit(
            &mut progress_cb,
            StudyStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );
        let manifest = store.load_manifest(&run_id)?;
        let report = StudyReport::from_series(&study.name, store.load_all_series(&run_id)?)?;
        tracing::info!(%run_id, "loaded cached run");

        emit(
            &mut progress_cb,
            StudyStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
            None,
        );
        return Ok(StudyResponse {
            run_id,
            manifest,
            report,
            loaded_from_cache: true,
        });
    }

    let records = if options.replay {
        hp_project::replay_records(&study, request.study_path, options.dataset.as_deref())?
    } else {
        None
    };

    let config = NewtonConfig::from(&study.solver);
    let report = match study.fluid {
        WorkingFluidDef::Water => {
            let service = StudyService::new(CycleSolver::with_config(WaterModel::new(), config))?;
            service.run_inner(&plan, records, &mut progress_cb, started)?
        }
    };

    emit(
        &mut progress_cb,
        StudyStage::SavingResults,
        started,
        Some("Saving run output".to_string()),
        None,
    );
    let series = report.series();
    let manifest = RunManifest::new(&run_id, &study.name, &options.solver_version, &series);
    store.save_run(&manifest, &series)?;
    tracing::info!(%run_id, series = series.len(), "run saved");

    emit(
        &mut progress_cb,
        StudyStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(StudyResponse {
        run_id,
        manifest,
        report,
        loaded_from_cache: false,
    })
}

/// Load, migrate and validate a study file.
pub fn load_study(study_path: &Path) -> AppResult<Study> {
    let study = hp_project::load_study(study_path)?;
    StudyPlan::from_study(&study, None)?;
    Ok(study)
}

/// Stored runs of a study, newest first.
pub fn list_runs(study_path: &Path) -> AppResult<Vec<RunManifest>> {
    let study = hp_project::load_study(study_path)?;
    let store = RunStore::for_study(study_path)?;
    Ok(store.list_runs(&study.name)?)
}

/// One stored series of a run.
pub fn load_series(study_path: &Path, run_id: &str, series: &str) -> AppResult<ResultSeries> {
    let store = RunStore::for_study(study_path)?;
    Ok(store.load_series(run_id, series)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_project::{
        DesignDef, MediumDef, RangeDef, SinkDef, SolverDef, SourceDef, SweepAxisDef, SweepDef,
    };

    fn study() -> Study {
        Study {
            version: hp_project::LATEST_VERSION,
            name: "plan".into(),
            fluid: WorkingFluidDef::Water,
            design: DesignDef {
                source: SourceDef {
                    medium: MediumDef::Air,
                    inlet_temperature_c: 40.0,
                    outlet_temperature_c: 10.0,
                    cooling_k: 2.0,
                    duty_kw: 1000.0,
                },
                sink: SinkDef {
                    medium: MediumDef::Water,
                    inlet_temperature_c: 40.0,
                    outlet_temperature_c: 90.0,
                    duty_kw: 1012.0,
                },
                compressor_efficiency: 0.85,
                evaporator_ttd_k: 5.0,
                condenser_ttd_k: 5.0,
                evaporator_outlet_quality: 1.0,
                condenser_outlet_quality: 0.0,
            },
            sweeps: vec![SweepDef {
                axis: SweepAxisDef::SourceTemperatureShift,
                range: RangeDef::Values {
                    values: vec![-5.0, 0.0],
                },
            }],
            replay: None,
            solver: SolverDef::default(),
        }
    }

    #[test]
    fn plan_selects_requested_axes() {
        let study = study();
        let all = StudyPlan::from_study(&study, None).unwrap();
        assert_eq!(all.sweeps.len(), 1);

        let none = StudyPlan::from_study(&study, Some(&[])).unwrap();
        assert!(none.sweeps.is_empty());

        let err =
            StudyPlan::from_study(&study, Some(&[SweepAxis::ThermalLoadScale])).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn report_round_trips_through_series() {
        let metrics = Metrics {
            cop: 4.2,
            compressor_power_w: 240e3,
            evaporator_duty_w: 772e3,
            condenser_duty_w: 1012e3,
        };
        let report = StudyReport {
            study_name: "plan".into(),
            design: metrics,
            design_state: None,
            sweeps: vec![ResultSeries::new("source_temperature_shift")],
            replay: Some(ResultSeries::new(REPLAY_SERIES)),
        };

        let series = report.series();
        let names: Vec<_> = series.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["design", "source_temperature_shift", "replay"]);

        let back = StudyReport::from_series("plan", series).unwrap();
        assert_eq!(back.design, metrics);
        assert_eq!(back.sweeps.len(), 1);
        assert!(back.replay.is_some());
    }
}
