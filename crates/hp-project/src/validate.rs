//! Study validation logic.
//!
//! Catches configuration mistakes before any solve is attempted. Physical
//! feasibility of the design point (saturation range, TTD ordering) is left
//! to the solver, which reports it as an infeasible constraint set.

use std::collections::HashSet;

use crate::schema::{DatasetSourceDef, DesignDef, RangeDef, SolverDef, Study, SweepDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate sweep axis: {axis}")]
    DuplicateAxis { axis: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

pub fn validate_study(study: &Study) -> Result<(), ValidationError> {
    if study.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: study.version,
        });
    }
    if study.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_design(&study.design)?;

    let mut axes = HashSet::new();
    for (i, sweep) in study.sweeps.iter().enumerate() {
        if !axes.insert(sweep.axis) {
            return Err(ValidationError::DuplicateAxis {
                axis: sweep.axis.as_str().to_string(),
            });
        }
        validate_sweep(i, sweep)?;
    }

    if let Some(replay) = &study.replay {
        if replay.samples == Some(0) {
            return Err(invalid("replay.samples", 0, "must be at least 1"));
        }
        if let DatasetSourceDef::File { path } = &replay.dataset
            && path.trim().is_empty()
        {
            return Err(invalid("replay.dataset.path", "\"\"", "must not be empty"));
        }
    }

    validate_solver(&study.solver)
}

fn validate_design(design: &DesignDef) -> Result<(), ValidationError> {
    finite(
        "design.source.inlet_temperature_c",
        design.source.inlet_temperature_c,
    )?;
    finite(
        "design.source.outlet_temperature_c",
        design.source.outlet_temperature_c,
    )?;
    positive("design.source.cooling_k", design.source.cooling_k)?;
    positive("design.source.duty_kw", design.source.duty_kw)?;
    finite(
        "design.sink.inlet_temperature_c",
        design.sink.inlet_temperature_c,
    )?;
    finite(
        "design.sink.outlet_temperature_c",
        design.sink.outlet_temperature_c,
    )?;
    positive("design.sink.duty_kw", design.sink.duty_kw)?;

    let eta = design.compressor_efficiency;
    if !(eta > 0.0 && eta <= 1.0) {
        return Err(invalid(
            "design.compressor_efficiency",
            eta,
            "must lie in (0, 1]",
        ));
    }
    finite("design.evaporator_ttd_k", design.evaporator_ttd_k)?;
    finite("design.condenser_ttd_k", design.condenser_ttd_k)?;
    for (field, x) in [
        (
            "design.evaporator_outlet_quality",
            design.evaporator_outlet_quality,
        ),
        (
            "design.condenser_outlet_quality",
            design.condenser_outlet_quality,
        ),
    ] {
        if !(0.0..=1.0).contains(&x) {
            return Err(invalid(field, x, "must lie in [0, 1]"));
        }
    }
    Ok(())
}

fn validate_sweep(i: usize, sweep: &SweepDef) -> Result<(), ValidationError> {
    let field = format!("sweeps[{i}].range");
    match &sweep.range {
        RangeDef::Values { values } => {
            if values.is_empty() {
                return Err(invalid(&field, "[]", "must contain at least one value"));
            }
            for v in values {
                finite(&field, *v)?;
            }
        }
        RangeDef::Linear { start, end, points } | RangeDef::Log { start, end, points } => {
            finite(&field, *start)?;
            finite(&field, *end)?;
            if *points == 0 {
                return Err(invalid(&field, points, "needs at least one point"));
            }
            if matches!(sweep.range, RangeDef::Log { .. }) && (*start <= 0.0 || *end <= 0.0) {
                return Err(invalid(
                    &field,
                    format!("{start}..{end}"),
                    "log range bounds must be positive",
                ));
            }
        }
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if solver.max_iterations == 0 {
        return Err(invalid("solver.max_iterations", 0, "must be at least 1"));
    }
    positive("solver.tolerance", solver.tolerance)
}
