//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus one `<series>.jsonl` per
//! result series, one case per line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::series::ResultSeries;
use crate::types::{CaseResult, RunManifest, SeriesEntry};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunManifest {
    /// Manifest for a run about to be saved, stamped with the current UTC time.
    pub fn new(
        run_id: impl Into<String>,
        study_name: impl Into<String>,
        solver_version: impl Into<String>,
        series: &[ResultSeries],
    ) -> Self {
        Self {
            run_id: run_id.into(),
            study_name: study_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            series: series
                .iter()
                .map(|s| SeriesEntry {
                    name: s.name().to_string(),
                    cases: s.len(),
                    converged: s.summary().converged,
                })
                .collect(),
        }
    }
}

fn check_series_name(name: &str) -> ResultsResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ResultsError::InvalidSeriesName(name.to_string()))
    }
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store located next to a study file, under `.heatflow/runs`.
    pub fn for_study(study_path: &Path) -> ResultsResult<Self> {
        let study_dir = study_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "study path has no parent directory".to_string(),
            })?;
        Self::new(study_dir.join(".heatflow").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, series: &[ResultSeries]) -> ResultsResult<()> {
        for s in series {
            check_series_name(s.name())?;
        }

        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        for s in series {
            let mut content = String::new();
            for case in s {
                content.push_str(&serde_json::to_string(case)?);
                content.push('\n');
            }
            fs::write(run_dir.join(format!("{}.jsonl", s.name())), content)?;
        }

        // Manifest last: its presence marks the run as complete.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_series(&self, run_id: &str, name: &str) -> ResultsResult<ResultSeries> {
        check_series_name(name)?;
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let path = self.run_dir(run_id).join(format!("{name}.jsonl"));
        if !path.exists() {
            return Err(ResultsError::SeriesNotFound {
                run_id: run_id.to_string(),
                series: name.to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let cases = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<CaseResult>(line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResultSeries::from_cases(name, cases))
    }

    /// Load every series listed in the run's manifest, in manifest order.
    pub fn load_all_series(&self, run_id: &str) -> ResultsResult<Vec<ResultSeries>> {
        let manifest = self.load_manifest(run_id)?;
        manifest
            .series
            .iter()
            .map(|entry| self.load_series(run_id, &entry.name))
            .collect()
    }

    /// Manifests of all runs of the named study, newest first.
    pub fn list_runs(&self, study_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.study_name == study_name
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }
}
