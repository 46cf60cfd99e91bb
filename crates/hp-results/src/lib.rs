//! hp-results: per-case results, result series, and the run cache.

pub mod hash;
pub mod series;
pub mod store;
pub mod types;

pub use hash::{compute_run_id, digest_file};
pub use series::{ResultSeries, SeriesSummary};
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Series '{series}' not found in run {run_id}")]
    SeriesNotFound { run_id: String, series: String },

    #[error("Invalid series name '{0}' (use letters, digits, '_' or '-')")]
    InvalidSeriesName(String),

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
