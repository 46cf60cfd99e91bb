//! hp-project: study file format, validation, and dataset sources.

pub mod convert;
pub mod dataset;
pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

pub use dataset::{
    DatasetError, DatasetReader, DatasetRecord, DatasetResult, RecordStream, SinkCondition,
    SourceCondition, open_dataset, resample,
};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_study};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Study> {
    let content = std::fs::read_to_string(path)?;
    let study: Study = serde_yaml::from_str(&content)?;
    finish_load(study)
}

pub fn save_yaml(path: &Path, study: &Study) -> ProjectResult<()> {
    validate_study(study)?;
    let content = serde_yaml::to_string(study)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Study> {
    let content = std::fs::read_to_string(path)?;
    let study: Study = serde_json::from_str(&content)?;
    finish_load(study)
}

pub fn save_json(path: &Path, study: &Study) -> ProjectResult<()> {
    validate_study(study)?;
    let content = serde_json::to_string_pretty(study)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a study, picking JSON for `.json` files and YAML otherwise.
pub fn load_study(path: &Path) -> ProjectResult<Study> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

fn finish_load(study: Study) -> ProjectResult<Study> {
    let study = migrate_to_latest(study)?;
    validate_study(&study)?;
    Ok(study)
}

/// Resolve a dataset path written in a study file against the study's directory.
pub fn resolve_dataset_path(study_path: &Path, dataset: &str) -> PathBuf {
    let dataset = Path::new(dataset);
    if dataset.is_absolute() {
        return dataset.to_path_buf();
    }
    study_path
        .parent()
        .map_or_else(|| dataset.to_path_buf(), |dir| dir.join(dataset))
}

/// Open the replay records of a study, applying its resampling setting.
///
/// `override_path` replaces the dataset named in the study file. Returns
/// `None` when the study has no replay section and no override is given.
pub fn replay_records(
    study: &Study,
    study_path: &Path,
    override_path: Option<&Path>,
) -> ProjectResult<Option<RecordStream>> {
    let samples = study.replay.as_ref().and_then(|r| r.samples);

    let stream: RecordStream = match (override_path, &study.replay) {
        (Some(path), _) => open_dataset(path)?,
        (None, Some(replay)) => match &replay.dataset {
            DatasetSourceDef::Inline { records } => {
                Box::new(records.clone().into_iter().map(Ok::<_, DatasetError>))
            }
            DatasetSourceDef::File { path } => {
                open_dataset(&resolve_dataset_path(study_path, path))?
            }
        },
        (None, None) => return Ok(None),
    };

    Ok(Some(match samples {
        Some(n) => {
            let items: Vec<_> = stream.collect();
            Box::new(resample(items, n).into_iter())
        }
        None => stream,
    }))
}
