//! Content-based hashing for run IDs.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// SHA-256 over the serialized study definition and the solver version.
pub fn compute_run_id<S: Serialize>(study: &S, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let study_json = serde_json::to_string(study)?;
    hasher.update(study_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

/// SHA-256 of a file's contents, for inputs that live outside the study file.
pub fn digest_file(path: &Path) -> ResultsResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
