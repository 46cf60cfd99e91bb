//! Metrics extraction from a converged solve state.

use hp_results::Metrics;
use hp_solver::SolveState;

use crate::error::InvalidStateError;

/// Read the performance figures of a converged state.
///
/// COP is condenser duty over compressor power. Pure: calling it twice on the
/// same state gives the same result.
pub fn extract(state: &SolveState) -> Result<Metrics, InvalidStateError> {
    if !state.is_converged() {
        return Err(InvalidStateError::NotConverged {
            status: state.status(),
        });
    }

    let perf = state.performance();
    let power = perf.compressor_power.value;
    if !(power.is_finite() && power > 0.0) {
        return Err(InvalidStateError::NonPhysical {
            what: format!("compressor power {power} W"),
        });
    }

    let condenser = perf.condenser_duty.value;
    Ok(Metrics {
        cop: condenser / power,
        compressor_power_w: power,
        evaporator_duty_w: perf.evaporator_duty.value,
        condenser_duty_w: condenser,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_core::units::{kgps, kw};
    use hp_solver::{CyclePerformance, SolveDiagnostics, SolveStatus};

    fn state(status: SolveStatus, power_kw: f64, evap_kw: f64) -> SolveState {
        SolveState::new(
            status,
            Vec::new(),
            CyclePerformance {
                refrigerant_mass_flow: kgps(0.35),
                compressor_power: kw(power_kw),
                evaporator_duty: kw(evap_kw),
                condenser_duty: kw(power_kw + evap_kw),
                source_mass_flow: kgps(380.0),
                sink_mass_flow: kgps(4.8),
            },
            SolveDiagnostics {
                iterations: 6,
                residual_norm: 1e-9,
            },
        )
    }

    #[test]
    fn cop_is_condenser_duty_over_power() {
        let m = extract(&state(SolveStatus::Converged, 250.0, 750.0)).unwrap();
        assert!((m.cop - 4.0).abs() < 1e-12);
        assert_eq!(m.compressor_power_w, 250_000.0);
        assert_eq!(m.condenser_duty_w, 1_000_000.0);
    }

    #[test]
    fn not_converged_state_is_rejected() {
        let err = extract(&state(SolveStatus::NotConverged, 250.0, 750.0)).unwrap_err();
        assert_eq!(
            err,
            InvalidStateError::NotConverged {
                status: SolveStatus::NotConverged
            }
        );
    }

    #[test]
    fn zero_power_is_not_physical() {
        let err = extract(&state(SolveStatus::Converged, 0.0, 750.0)).unwrap_err();
        assert!(matches!(err, InvalidStateError::NonPhysical { .. }));
    }
}
