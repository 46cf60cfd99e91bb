//! Fluid property errors.

use hp_core::HpError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative pressure, temperature, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value outside the model's valid phase envelope.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Convergence failure (e.g., inverting the saturation curve).
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },
}

impl From<FluidError> for HpError {
    fn from(err: FluidError) -> Self {
        HpError::Invariant {
            what: format!("Fluid property error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::OutOfRange {
            what: "saturation temperature",
            value: 700.0,
        };
        assert!(err.to_string().contains("700"));
    }

    #[test]
    fn error_to_hp_error() {
        let fluid_err = FluidError::InvalidArg { what: "quality" };
        let hp_err: HpError = fluid_err.into();
        assert!(matches!(hp_err, HpError::Invariant { .. }));
    }
}
