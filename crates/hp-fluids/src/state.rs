//! Thermodynamic state definitions.

use crate::error::{FluidError, FluidResult};
use hp_core::units::{Pressure, Temperature};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Pair of independent variables used to fix a thermodynamic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature (single-phase only).
    PT { p: Pressure, t: Temperature },
    /// Pressure and specific enthalpy.
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
    /// Pressure and vapor quality (saturated).
    PQ { p: Pressure, x: f64 },
    /// Temperature and vapor quality (saturated).
    TQ { t: Temperature, x: f64 },
}

/// Fully resolved thermodynamic state of the working fluid.
///
/// `quality` is `Some` inside (or on the boundary of) the vapor dome and
/// `None` for subcooled liquid or superheated vapor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoState {
    p: Pressure,
    t: Temperature,
    h: SpecEnthalpy,
    s: SpecEntropy,
    quality: Option<f64>,
}

impl ThermoState {
    /// Assemble a state, validating that every value is physical.
    pub fn new(
        p: Pressure,
        t: Temperature,
        h: SpecEnthalpy,
        s: SpecEntropy,
        quality: Option<f64>,
    ) -> FluidResult<Self> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if !h.is_finite() || !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy and entropy must be finite",
            });
        }
        if let Some(x) = quality
            && !(0.0..=1.0).contains(&x)
        {
            return Err(FluidError::NonPhysical {
                what: "quality must lie in [0, 1]",
            });
        }
        Ok(Self {
            p,
            t,
            h,
            s,
            quality,
        })
    }

    /// Get pressure.
    pub fn pressure(&self) -> Pressure {
        self.p
    }

    /// Get temperature.
    pub fn temperature(&self) -> Temperature {
        self.t
    }

    /// Specific enthalpy [J/kg].
    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.h
    }

    /// Specific entropy [J/(kg·K)].
    pub fn entropy(&self) -> SpecEntropy {
        self.s
    }

    /// Vapor quality, if saturated.
    pub fn quality(&self) -> Option<f64> {
        self.quality
    }
}
