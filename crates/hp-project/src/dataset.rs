//! Time-series dataset of source/sink conditions.
//!
//! JSON Lines files are read lazily, one record per line. YAML and JSON files
//! hold a single array and are read whole.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported dataset extension '{0}' (expected jsonl, yaml, yml or json)")]
    UnsupportedFormat(String),

    #[error("record {timestamp}: {field} must be finite")]
    NonFinite {
        timestamp: String,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCondition {
    pub inlet_temperature_c: f64,
    pub outlet_temperature_c: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkCondition {
    pub inlet_temperature_c: f64,
    pub outlet_temperature_c: f64,
    /// Heat delivered over the timestep, as average power.
    pub duty_kw: f64,
}

/// One timestep of measured boundary conditions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetRecord {
    pub timestamp: String,
    pub source: SourceCondition,
    pub sink: SinkCondition,
}

impl DatasetRecord {
    /// Reject records carrying NaN or infinite values.
    pub fn check_finite(&self) -> DatasetResult<()> {
        let fields = [
            ("source.inlet_temperature_c", self.source.inlet_temperature_c),
            ("source.outlet_temperature_c", self.source.outlet_temperature_c),
            ("sink.inlet_temperature_c", self.sink.inlet_temperature_c),
            ("sink.outlet_temperature_c", self.sink.outlet_temperature_c),
            ("sink.duty_kw", self.sink.duty_kw),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(field, _)) => Err(DatasetError::NonFinite {
                timestamp: self.timestamp.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Lazy JSON Lines reader. Blank lines are skipped; a bad line yields an
/// `Err` item and reading continues with the next line.
pub struct DatasetReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> DatasetReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl DatasetReader<BufReader<File>> {
    pub fn open(path: &Path) -> DatasetResult<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for DatasetReader<R> {
    type Item = DatasetResult<DatasetRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&line).map_err(|e| DatasetError::Parse {
                    line: self.line_no,
                    message: e.to_string(),
                }),
            );
        }
    }
}

/// Boxed record stream, as handed to the replay controller.
pub type RecordStream = Box<dyn Iterator<Item = DatasetResult<DatasetRecord>>>;

/// Open a dataset file, choosing the format from its extension.
pub fn open_dataset(path: &Path) -> DatasetResult<RecordStream> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jsonl" | "ndjson" => Ok(Box::new(DatasetReader::open(path)?)),
        "yaml" | "yml" => {
            let records: Vec<DatasetRecord> =
                serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
            Ok(Box::new(records.into_iter().map(Ok)))
        }
        "json" => {
            let records: Vec<DatasetRecord> =
                serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(Box::new(records.into_iter().map(Ok)))
        }
        other => Err(DatasetError::UnsupportedFormat(other.to_string())),
    }
}

/// Indices of `n` evenly spaced items out of `len`, first and last included.
///
/// Positions are truncated toward zero. Asking for at least `len` items
/// returns every index once.
pub fn evenly_spaced_indices(len: usize, n: usize) -> Vec<usize> {
    if n >= len {
        return (0..len).collect();
    }
    match n {
        0 => Vec::new(),
        1 => vec![0],
        _ => (0..n).map(|i| i * (len - 1) / (n - 1)).collect(),
    }
}

/// Keep `n` evenly spaced items of `items`, in order.
pub fn resample<T>(items: Vec<T>, n: usize) -> Vec<T> {
    let keep = evenly_spaced_indices(items.len(), n);
    let mut keep = keep.into_iter().peekable();
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            if keep.peek() == Some(&i) {
                keep.next();
                Some(item)
            } else {
                None
            }
        })
        .collect()
}
