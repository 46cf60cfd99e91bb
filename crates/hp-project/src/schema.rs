//! Study file schema.
//!
//! User-facing units: °C for temperatures, K for temperature differences,
//! kW for duties. Conversion to SI happens in [`crate::convert`].

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Study {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub fluid: WorkingFluidDef,
    pub design: DesignDef,
    #[serde(default)]
    pub sweeps: Vec<SweepDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay: Option<ReplayDef>,
    #[serde(default)]
    pub solver: SolverDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkingFluidDef {
    #[default]
    Water,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediumDef {
    Air,
    Water,
}

fn default_source_medium() -> MediumDef {
    MediumDef::Air
}

fn default_sink_medium() -> MediumDef {
    MediumDef::Water
}

fn default_source_cooling_k() -> f64 {
    2.0
}

fn default_ttd_k() -> f64 {
    5.0
}

fn default_evaporator_outlet_quality() -> f64 {
    1.0
}

fn default_condenser_outlet_quality() -> f64 {
    0.0
}

/// Heat source stream at the design point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDef {
    #[serde(default = "default_source_medium")]
    pub medium: MediumDef,
    pub inlet_temperature_c: f64,
    pub outlet_temperature_c: f64,
    /// Temperature drop of the source stream across the evaporator.
    #[serde(default = "default_source_cooling_k")]
    pub cooling_k: f64,
    /// Nominal heat extraction (initial estimate only).
    pub duty_kw: f64,
}

/// Heat sink stream at the design point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkDef {
    #[serde(default = "default_sink_medium")]
    pub medium: MediumDef,
    pub inlet_temperature_c: f64,
    pub outlet_temperature_c: f64,
    /// Heat delivered to the sink; positive.
    pub duty_kw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignDef {
    pub source: SourceDef,
    pub sink: SinkDef,
    pub compressor_efficiency: f64,
    #[serde(default = "default_ttd_k")]
    pub evaporator_ttd_k: f64,
    #[serde(default = "default_ttd_k")]
    pub condenser_ttd_k: f64,
    #[serde(default = "default_evaporator_outlet_quality")]
    pub evaporator_outlet_quality: f64,
    #[serde(default = "default_condenser_outlet_quality")]
    pub condenser_outlet_quality: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxisDef {
    /// Shift of the source inlet and outlet temperatures [K].
    SourceTemperatureShift,
    /// Multiplier on the sink duty and the nominal source duty [-].
    ThermalLoadScale,
}

impl SweepAxisDef {
    pub fn as_str(self) -> &'static str {
        match self {
            SweepAxisDef::SourceTemperatureShift => "source_temperature_shift",
            SweepAxisDef::ThermalLoadScale => "thermal_load_scale",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeDef {
    Values { values: Vec<f64> },
    Linear { start: f64, end: f64, points: usize },
    Log { start: f64, end: f64, points: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub axis: SweepAxisDef,
    pub range: RangeDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatasetSourceDef {
    Inline { records: Vec<DatasetRecord> },
    /// JSON Lines, YAML or JSON file; relative paths resolve against the study file.
    File { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayDef {
    pub dataset: DatasetSourceDef,
    /// Replay only this many evenly spaced records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
}

fn default_max_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_line_search_iters() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_line_search_iters")]
    pub max_line_search_iters: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            max_line_search_iters: default_max_line_search_iters(),
        }
    }
}
