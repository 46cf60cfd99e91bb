//! Boundary specification: the complete set of constraints for one solve.

use hp_core::units::{Power, TempInterval, Temperature, delta_k, to_degc};
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Secondary medium flowing through a heat exchanger, modelled with constant cp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryMedium {
    Air,
    Water,
}

impl SecondaryMedium {
    /// Isobaric specific heat [J/(kg·K)].
    pub fn cp(self) -> f64 {
        match self {
            SecondaryMedium::Air => 1006.0,
            SecondaryMedium::Water => 4186.0,
        }
    }
}

/// Heat source stream (evaporator hot side).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBoundary {
    pub medium: SecondaryMedium,
    pub inlet_temperature: Temperature,
    /// Nominal outlet temperature; only used to place the unseeded evaporation guess.
    pub outlet_temperature: Temperature,
    /// Temperature drop of the source stream across the evaporator.
    pub cooling: TempInterval,
    /// Nominal heat extraction; an initial estimate, not a constraint.
    pub nominal_duty: Power,
}

/// Heat sink stream (condenser cold side).
#[derive(Debug, Clone, PartialEq)]
pub struct SinkBoundary {
    pub medium: SecondaryMedium,
    pub inlet_temperature: Temperature,
    pub outlet_temperature: Temperature,
    /// Heat delivered to the sink (positive).
    pub duty: Power,
}

/// Constraints imposed on the cycle for a single solve.
///
/// Values are in SI. A spec is never mutated in place: perturbations and
/// dataset overlays build a new one from a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySpec {
    pub source: SourceBoundary,
    pub sink: SinkBoundary,
    /// Isentropic compressor efficiency in (0, 1].
    pub compressor_efficiency: f64,
    /// Evaporator upper terminal temperature difference.
    pub evaporator_ttd: TempInterval,
    /// Condenser upper terminal temperature difference (against the condensing temperature).
    pub condenser_ttd: TempInterval,
    /// Working-fluid quality leaving the evaporator.
    pub evaporator_outlet_quality: f64,
    /// Working-fluid quality leaving the condenser.
    pub condenser_outlet_quality: f64,
}

impl BoundarySpec {
    /// Standard saturation targets: saturated vapor to the compressor, saturated liquid to the valve.
    pub fn new(source: SourceBoundary, sink: SinkBoundary, compressor_efficiency: f64) -> Self {
        Self {
            source,
            sink,
            compressor_efficiency,
            evaporator_ttd: delta_k(5.0),
            condenser_ttd: delta_k(5.0),
            evaporator_outlet_quality: 1.0,
            condenser_outlet_quality: 0.0,
        }
    }

    /// Target evaporating temperature implied by the source inlet and TTD.
    pub fn evaporation_target(&self) -> Temperature {
        self.source.inlet_temperature - self.evaporator_ttd
    }

    /// Target condensing temperature implied by the sink outlet and TTD.
    pub fn condensation_target(&self) -> Temperature {
        self.sink.outlet_temperature + self.condenser_ttd
    }

    /// Check that every value is finite and the constraint set admits a cycle.
    ///
    /// Does not consult the fluid model; saturation-range checks happen in the solver.
    pub fn check_feasible(&self) -> SolverResult<()> {
        let finite = [
            self.source.inlet_temperature.value,
            self.source.outlet_temperature.value,
            self.source.cooling.value,
            self.source.nominal_duty.value,
            self.sink.inlet_temperature.value,
            self.sink.outlet_temperature.value,
            self.sink.duty.value,
            self.compressor_efficiency,
            self.evaporator_ttd.value,
            self.condenser_ttd.value,
            self.evaporator_outlet_quality,
            self.condenser_outlet_quality,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::ProblemSetup {
                what: "boundary specification contains a non-finite value".into(),
            });
        }

        let infeasible = |what: String| Err(SolverError::Infeasible { what });

        if !(self.compressor_efficiency > 0.0 && self.compressor_efficiency <= 1.0) {
            return infeasible(format!(
                "compressor efficiency {} outside (0, 1]",
                self.compressor_efficiency
            ));
        }
        for (name, x) in [
            ("evaporator outlet", self.evaporator_outlet_quality),
            ("condenser outlet", self.condenser_outlet_quality),
        ] {
            if !(0.0..=1.0).contains(&x) {
                return infeasible(format!("{name} quality {x} outside [0, 1]"));
            }
        }
        if self.sink.duty.value <= 0.0 || self.source.nominal_duty.value <= 0.0 {
            return infeasible("heat duties must be positive".into());
        }
        if self.source.cooling.value <= 0.0 {
            return infeasible("source stream must cool across the evaporator".into());
        }
        if self.source.outlet_temperature >= self.source.inlet_temperature {
            return infeasible(format!(
                "source outlet {:.2} °C is not below inlet {:.2} °C",
                to_degc(self.source.outlet_temperature),
                to_degc(self.source.inlet_temperature)
            ));
        }
        if self.sink.outlet_temperature <= self.sink.inlet_temperature {
            return infeasible(format!(
                "sink outlet {:.2} °C is not above inlet {:.2} °C",
                to_degc(self.sink.outlet_temperature),
                to_degc(self.sink.inlet_temperature)
            ));
        }
        if self.evaporation_target() >= self.condensation_target() {
            return infeasible(format!(
                "evaporation target {:.2} °C not below condensation target {:.2} °C",
                to_degc(self.evaporation_target()),
                to_degc(self.condensation_target())
            ));
        }
        Ok(())
    }
}
