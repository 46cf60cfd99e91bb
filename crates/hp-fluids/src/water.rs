//! Correlation-based water/steam property model.
//!
//! - Saturation pressure: Wagner–Pruss auxiliary equation (IAPWS).
//! - Saturated liquid: constant cp, referenced to h = s = 0 at the triple point.
//! - Latent heat: Watson correlation anchored at the normal boiling point.
//! - Superheated vapor: constant cp from the saturated vapor state at the same pressure.
//!
//! Accurate to a few percent across the heat pump operating range, and
//! smooth everywhere, which is what the Newton network solver needs.

use crate::error::{FluidError, FluidResult};
use crate::model::FluidModel;
use crate::model::validation::{
    validate_caloric, validate_pressure, validate_quality, validate_temperature,
};
use crate::state::{SpecEnthalpy, SpecEntropy, StateInput, ThermoState};
use hp_core::units::{Pressure, Temperature, k, pa};

const T_CRIT_K: f64 = 647.096;
const P_CRIT_PA: f64 = 22.064e6;
const T_TRIPLE_K: f64 = 273.16;
const T_NBP_K: f64 = 373.124;
const P_NBP_PA: f64 = 101_325.0;
const H_FG_NBP: f64 = 2_256_470.0;
const WATSON_EXPONENT: f64 = 0.38;
const R_SPECIFIC: f64 = 461.526;

/// Wagner–Pruss coefficients a1..a6.
const WAGNER: [f64; 6] = [
    -7.859_517_83,
    1.844_082_59,
    -11.786_649_7,
    22.680_741_1,
    -15.961_871_9,
    1.801_225_02,
];

const TSAT_MAX_ITER: usize = 50;
const TSAT_TOL_K: f64 = 1e-10;

/// Saturation properties at a single temperature.
#[derive(Debug, Clone, Copy)]
struct Saturation {
    t: f64,
    p: f64,
    hf: SpecEnthalpy,
    hfg: SpecEnthalpy,
    sf: SpecEntropy,
}

impl Saturation {
    fn hg(&self) -> SpecEnthalpy {
        self.hf + self.hfg
    }

    fn sfg(&self) -> SpecEntropy {
        self.hfg / self.t
    }

    fn sg(&self) -> SpecEntropy {
        self.sf + self.sfg()
    }
}

/// Pure water with correlation-based properties.
#[derive(Debug, Clone)]
pub struct WaterModel {
    /// Liquid specific heat [J/(kg·K)]
    cp_liquid: f64,
    /// Superheated vapor specific heat [J/(kg·K)]
    cp_vapor: f64,
}

impl Default for WaterModel {
    fn default() -> Self {
        Self {
            cp_liquid: 4186.0,
            cp_vapor: 1900.0,
        }
    }
}

impl WaterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduced log saturation pressure ln(p/pc) and its temperature derivative.
    fn ln_psat_reduced(t: f64) -> (f64, f64) {
        let tau = 1.0 - t / T_CRIT_K;
        let [a1, a2, a3, a4, a5, a6] = WAGNER;
        let g = a1 * tau
            + a2 * tau.powf(1.5)
            + a3 * tau.powi(3)
            + a4 * tau.powf(3.5)
            + a5 * tau.powi(4)
            + a6 * tau.powf(7.5);
        let dg = a1
            + 1.5 * a2 * tau.sqrt()
            + 3.0 * a3 * tau.powi(2)
            + 3.5 * a4 * tau.powf(2.5)
            + 4.0 * a5 * tau.powi(3)
            + 7.5 * a6 * tau.powf(6.5);
        let theta = 1.0 - tau;
        let f = g / theta;
        let df_dtau = dg / theta + g / (theta * theta);
        (f, -df_dtau / T_CRIT_K)
    }

    fn check_saturation_temperature(t: f64) -> FluidResult<()> {
        if !(T_TRIPLE_K..T_CRIT_K).contains(&t) {
            return Err(FluidError::OutOfRange {
                what: "saturation temperature [K]",
                value: t,
            });
        }
        Ok(())
    }

    fn psat(t: f64) -> f64 {
        P_CRIT_PA * Self::ln_psat_reduced(t).0.exp()
    }

    /// Invert the saturation curve with Newton on ln(p).
    fn tsat(p: f64) -> FluidResult<f64> {
        let p_min = Self::psat(T_TRIPLE_K);
        if !(p_min..P_CRIT_PA).contains(&p) {
            return Err(FluidError::OutOfRange {
                what: "saturation pressure [Pa]",
                value: p,
            });
        }

        let target = (p / P_CRIT_PA).ln();
        let t_hi = T_CRIT_K - 1e-9;
        // Clausius-Clapeyron starting point
        let inv_t0 = 1.0 / T_NBP_K - R_SPECIFIC / H_FG_NBP * (p / P_NBP_PA).ln();
        let mut t = (1.0 / inv_t0).clamp(T_TRIPLE_K, t_hi);

        for _ in 0..TSAT_MAX_ITER {
            let (f, df) = Self::ln_psat_reduced(t);
            let step = (f - target) / df;
            let t_next = (t - step).clamp(T_TRIPLE_K, t_hi);
            if (t_next - t).abs() < TSAT_TOL_K {
                return Ok(t_next);
            }
            t = t_next;
        }

        Err(FluidError::ConvergenceFailed {
            what: "saturation temperature from pressure",
        })
    }

    fn latent_heat(t: f64) -> SpecEnthalpy {
        H_FG_NBP * ((T_CRIT_K - t) / (T_CRIT_K - T_NBP_K)).powf(WATSON_EXPONENT)
    }

    fn saturation_at_t(&self, t: f64) -> FluidResult<Saturation> {
        Self::check_saturation_temperature(t)?;
        Ok(Saturation {
            t,
            p: Self::psat(t),
            hf: self.cp_liquid * (t - T_TRIPLE_K),
            hfg: Self::latent_heat(t),
            sf: self.cp_liquid * (t / T_TRIPLE_K).ln(),
        })
    }

    fn saturation_at_p(&self, p: f64) -> FluidResult<Saturation> {
        let t = Self::tsat(p)?;
        let mut sat = self.saturation_at_t(t)?;
        // Keep the requested pressure exactly rather than the round-tripped one.
        sat.p = p;
        Ok(sat)
    }

    fn two_phase(sat: &Saturation, x: f64) -> FluidResult<ThermoState> {
        ThermoState::new(
            pa(sat.p),
            k(sat.t),
            sat.hf + x * sat.hfg,
            sat.sf + x * sat.sfg(),
            Some(x),
        )
    }

    fn liquid_from_t(&self, p: f64, t: f64) -> FluidResult<ThermoState> {
        if t < T_TRIPLE_K {
            return Err(FluidError::OutOfRange {
                what: "liquid temperature [K]",
                value: t,
            });
        }
        ThermoState::new(
            pa(p),
            k(t),
            self.cp_liquid * (t - T_TRIPLE_K),
            self.cp_liquid * (t / T_TRIPLE_K).ln(),
            None,
        )
    }

    fn vapor_from_t(&self, sat: &Saturation, t: f64) -> FluidResult<ThermoState> {
        ThermoState::new(
            pa(sat.p),
            k(t),
            sat.hg() + self.cp_vapor * (t - sat.t),
            sat.sg() + self.cp_vapor * (t / sat.t).ln(),
            None,
        )
    }
}

impl FluidModel for WaterModel {
    fn name(&self) -> &str {
        "water (correlations)"
    }

    fn state(&self, input: StateInput) -> FluidResult<ThermoState> {
        match input {
            StateInput::TQ { t, x } => {
                validate_temperature(t)?;
                validate_quality(x)?;
                let sat = self.saturation_at_t(t.value)?;
                Self::two_phase(&sat, x)
            }
            StateInput::PQ { p, x } => {
                validate_pressure(p)?;
                validate_quality(x)?;
                let sat = self.saturation_at_p(p.value)?;
                Self::two_phase(&sat, x)
            }
            StateInput::PT { p, t } => {
                validate_pressure(p)?;
                validate_temperature(t)?;
                let sat = self.saturation_at_p(p.value)?;
                if t.value > sat.t {
                    self.vapor_from_t(&sat, t.value)
                } else if t.value < sat.t {
                    self.liquid_from_t(p.value, t.value)
                } else {
                    Err(FluidError::InvalidArg {
                        what: "pressure and temperature do not fix a state on the saturation line",
                    })
                }
            }
            StateInput::PH { p, h } => {
                validate_pressure(p)?;
                validate_caloric(h, "enthalpy must be finite")?;
                let sat = self.saturation_at_p(p.value)?;
                if h < sat.hf {
                    self.liquid_from_t(p.value, T_TRIPLE_K + h / self.cp_liquid)
                } else if h > sat.hg() {
                    self.vapor_from_t(&sat, sat.t + (h - sat.hg()) / self.cp_vapor)
                } else {
                    Self::two_phase(&sat, (h - sat.hf) / sat.hfg)
                }
            }
            StateInput::PS { p, s } => {
                validate_pressure(p)?;
                validate_caloric(s, "entropy must be finite")?;
                let sat = self.saturation_at_p(p.value)?;
                if s < sat.sf {
                    self.liquid_from_t(p.value, T_TRIPLE_K * (s / self.cp_liquid).exp())
                } else if s > sat.sg() {
                    self.vapor_from_t(&sat, sat.t * ((s - sat.sg()) / self.cp_vapor).exp())
                } else {
                    Self::two_phase(&sat, (s - sat.sf) / sat.sfg())
                }
            }
        }
    }

    fn critical_temperature(&self) -> Temperature {
        k(T_CRIT_K)
    }

    fn triple_temperature(&self) -> Temperature {
        k(T_TRIPLE_K)
    }

    fn saturation_pressure(&self, t: Temperature) -> FluidResult<Pressure> {
        validate_temperature(t)?;
        Self::check_saturation_temperature(t.value)?;
        Ok(pa(Self::psat(t.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_core::units::degc;

    #[test]
    fn saturation_pressure_matches_steam_tables() {
        let water = WaterModel::new();
        // (T [°C], p [kPa]) from IAPWS-IF97 tables
        for (t_c, p_kpa) in [(10.0, 1.2282), (35.0, 5.6291), (95.0, 84.609), (180.0, 1002.8)] {
            let p = water.saturation_pressure(degc(t_c)).unwrap().value / 1e3;
            assert!(
                (p - p_kpa).abs() / p_kpa < 2e-3,
                "psat({t_c} °C) = {p} kPa, expected {p_kpa}"
            );
        }
    }

    #[test]
    fn tsat_inverts_psat() {
        for t in [275.0, 300.0, 373.124, 500.0, 640.0] {
            let p = WaterModel::psat(t);
            let back = WaterModel::tsat(p).unwrap();
            assert!((back - t).abs() < 1e-6, "{t} -> {p} -> {back}");
        }
    }

    #[test]
    fn latent_heat_is_anchored_at_normal_boiling_point() {
        assert!((WaterModel::latent_heat(T_NBP_K) - H_FG_NBP).abs() < 1e-6);
        assert!(WaterModel::latent_heat(300.0) > WaterModel::latent_heat(400.0));
    }

    #[test]
    fn out_of_envelope_is_rejected() {
        let water = WaterModel::new();
        let err = water
            .state(StateInput::TQ {
                t: degc(400.0),
                x: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, FluidError::OutOfRange { .. }));

        let err = water
            .state(StateInput::PQ {
                p: pa(30.0e6),
                x: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, FluidError::OutOfRange { .. }));
    }
}
