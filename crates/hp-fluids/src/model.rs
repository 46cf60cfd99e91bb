//! Fluid property model trait and validation helpers.

use crate::error::{FluidError, FluidResult};
use crate::state::{StateInput, ThermoState};
use hp_core::units::{Pressure, Temperature};

/// Trait for working-fluid property models.
///
/// Given two independent state variables, a model resolves the remaining
/// ones. Implementations fail with [`FluidError::OutOfRange`] for states
/// outside their valid phase envelope.
pub trait FluidModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Resolve a full thermodynamic state from an input pair.
    fn state(&self, input: StateInput) -> FluidResult<ThermoState>;

    /// Critical temperature; saturation lookups are only defined below it.
    fn critical_temperature(&self) -> Temperature;

    /// Triple-point temperature; the lower end of the liquid range.
    fn triple_temperature(&self) -> Temperature;

    /// Saturation temperature at the given pressure.
    fn saturation_temperature(&self, p: Pressure) -> FluidResult<Temperature> {
        Ok(self.state(StateInput::PQ { p, x: 0.0 })?.temperature())
    }

    /// Saturation pressure at the given temperature.
    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure> {
        Ok(self.state(StateInput::TQ { t, x: 0.0 })?.pressure())
    }

    /// Whether `t` lies strictly inside the saturation range of the fluid.
    fn is_subcritical(&self, t: Temperature) -> bool {
        t.value >= self.triple_temperature().value && t.value < self.critical_temperature().value
    }
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure vapor quality is inside [0, 1].
    pub fn validate_quality(x: f64) -> FluidResult<()> {
        if !x.is_finite() || !(0.0..=1.0).contains(&x) {
            return Err(FluidError::InvalidArg {
                what: "quality must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Ensure a caloric value (enthalpy or entropy) is finite (can be negative).
    pub fn validate_caloric(v: f64, what: &'static str) -> FluidResult<()> {
        if !v.is_finite() {
            return Err(FluidError::NonPhysical { what });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use hp_core::units::{k, pa};

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(pa(101325.0)).is_ok());
        assert!(validate_pressure(pa(-100.0)).is_err());
        assert!(validate_pressure(pa(0.0)).is_err());
        assert!(validate_pressure(pa(f64::NAN)).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(k(300.0)).is_ok());
        assert!(validate_temperature(k(-10.0)).is_err());
        assert!(validate_temperature(k(0.0)).is_err());
    }

    #[test]
    fn validate_quality_bounds() {
        assert!(validate_quality(0.0).is_ok());
        assert!(validate_quality(1.0).is_ok());
        assert!(validate_quality(-0.1).is_err());
        assert!(validate_quality(f64::NAN).is_err());
    }

    #[test]
    fn validate_caloric_finite() {
        assert!(validate_caloric(-5.0, "enthalpy").is_ok());
        assert!(validate_caloric(f64::INFINITY, "enthalpy").is_err());
    }
}
