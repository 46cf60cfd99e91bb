//! Newton solver for the single-stage vapor-compression cycle.
//!
//! Unknowns (scaled): `[ln p_evap, ln p_cond, h_comp_out / 1e6, m_dot]`.
//!
//! Residuals:
//! - evaporating temperature vs. source inlet minus evaporator TTD [K]
//! - condensing temperature vs. sink outlet plus condenser TTD [K]
//! - isentropic efficiency closure on the compressor [1e5 J/kg]
//! - condenser duty vs. the imposed sink duty [relative]
//!
//! The evaporator and condenser outlet qualities are imposed directly, the
//! expansion valve is isenthalpic and the cycle closer passes its inlet state
//! through, so those contribute no unknowns.

use hp_core::units::{MassRate, Power, Temperature, k, kgps, pa, to_degc, watt};
use hp_fluids::{FluidModel, StateInput, ThermoState};
use hp_graph::{ComponentRole, Topology};
use nalgebra::DVector;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::network::NetworkSolver;
use crate::newton::{NewtonConfig, newton_solve};
use crate::spec::BoundarySpec;
use crate::state::{CyclePerformance, NodeState, SolveDiagnostics, SolveState, SolveStatus};

const H_SCALE: f64 = 1e6;
const EFFICIENCY_RESIDUAL_SCALE: f64 = 1e5;
/// Keeps the unseeded guess strictly inside the saturation range.
const GUESS_MARGIN_K: f64 = 0.5;

/// Working-fluid states at one iterate.
struct CyclePoint {
    evaporator_out: ThermoState,
    compressor_out_isentropic_h: f64,
    condenser_out: ThermoState,
    compressor_out_h: f64,
    p_cond: f64,
    mass_flow: f64,
}

/// Newton-based [`NetworkSolver`] for the heat pump loop.
#[derive(Debug, Clone)]
pub struct CycleSolver<M: FluidModel> {
    fluid: M,
    config: NewtonConfig,
}

impl<M: FluidModel> CycleSolver<M> {
    pub fn new(fluid: M) -> Self {
        Self::with_config(fluid, NewtonConfig::default())
    }

    pub fn with_config(fluid: M, config: NewtonConfig) -> Self {
        Self { fluid, config }
    }

    pub fn fluid(&self) -> &M {
        &self.fluid
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// Both saturation targets must lie inside the fluid's two-phase range.
    fn check_envelope(&self, spec: &BoundarySpec) -> SolverResult<()> {
        let t_triple = self.fluid.triple_temperature();
        let t_crit = self.fluid.critical_temperature();
        for (name, target) in [
            ("evaporation", spec.evaporation_target()),
            ("condensation", spec.condensation_target()),
        ] {
            if target <= t_triple || target >= t_crit {
                return Err(SolverError::Infeasible {
                    what: format!(
                        "{name} temperature {:.2} °C outside the {} saturation range ({:.2} to {:.2} °C)",
                        to_degc(target),
                        self.fluid.name(),
                        to_degc(t_triple),
                        to_degc(t_crit)
                    ),
                });
            }
        }
        Ok(())
    }

    fn state(&self, input: StateInput) -> SolverResult<ThermoState> {
        Ok(self.fluid.state(input)?)
    }

    /// Starting point without a seed: evaporate at the source outlet
    /// temperature, condense at the sink outlet temperature, and size the
    /// mass flow from the nominal source duty.
    fn initial_guess(&self, spec: &BoundarySpec) -> SolverResult<DVector<f64>> {
        let t_lo = self.fluid.triple_temperature().value + GUESS_MARGIN_K;
        let t_hi = self.fluid.critical_temperature().value - GUESS_MARGIN_K;

        let t_evap = spec
            .source
            .outlet_temperature
            .value
            .min(spec.evaporation_target().value)
            .clamp(t_lo, t_hi);
        let t_cond = spec
            .sink
            .outlet_temperature
            .value
            .clamp(t_evap + 1.0, t_hi.max(t_evap + 1.0));

        let p_evap = self.fluid.saturation_pressure(k(t_evap))?;
        let p_cond = self.fluid.saturation_pressure(k(t_cond))?;

        let evap_out = self.state(StateInput::PQ {
            p: p_evap,
            x: spec.evaporator_outlet_quality,
        })?;
        let cond_out = self.state(StateInput::PQ {
            p: p_cond,
            x: spec.condenser_outlet_quality,
        })?;
        let h2 = evap_out.enthalpy();
        let h3s = self
            .state(StateInput::PS {
                p: p_cond,
                s: evap_out.entropy(),
            })?
            .enthalpy();
        let h3 = h2 + (h3s - h2) / spec.compressor_efficiency;

        let dh_evap = h2 - cond_out.enthalpy();
        if dh_evap <= 0.0 {
            return Err(SolverError::Infeasible {
                what: "evaporator outlet enthalpy is not above condenser outlet enthalpy".into(),
            });
        }
        let mass_flow = spec.source.nominal_duty.value / dh_evap;

        Ok(DVector::from_vec(vec![
            p_evap.value.ln(),
            p_cond.value.ln(),
            h3 / H_SCALE,
            mass_flow,
        ]))
    }

    /// Unknown vector recovered from a previous solution on the same topology.
    fn seed_vector(topology: &Topology, seed: &SolveState) -> Option<DVector<f64>> {
        let evap_out = &seed
            .node(topology.outlet_node(ComponentRole::SourceHeatExchanger))?
            .state;
        let comp_out = &seed
            .node(topology.outlet_node(ComponentRole::Compressor))?
            .state;
        let mass_flow = seed.performance().refrigerant_mass_flow.value;
        let x = DVector::from_vec(vec![
            evap_out.pressure().value.ln(),
            comp_out.pressure().value.ln(),
            comp_out.enthalpy() / H_SCALE,
            mass_flow,
        ]);
        Self::admissible(&x).then_some(x)
    }

    fn admissible(x: &DVector<f64>) -> bool {
        x.iter().all(|v| v.is_finite()) && x[1] > x[0] && x[2] > 0.0 && x[3] > 0.0
    }

    fn evaluate(&self, spec: &BoundarySpec, x: &DVector<f64>) -> SolverResult<CyclePoint> {
        let p_evap = pa(x[0].exp());
        let p_cond = pa(x[1].exp());

        let evaporator_out = self.state(StateInput::PQ {
            p: p_evap,
            x: spec.evaporator_outlet_quality,
        })?;
        let condenser_out = self.state(StateInput::PQ {
            p: p_cond,
            x: spec.condenser_outlet_quality,
        })?;
        let compressor_out_isentropic_h = self
            .state(StateInput::PS {
                p: p_cond,
                s: evaporator_out.entropy(),
            })?
            .enthalpy();

        Ok(CyclePoint {
            evaporator_out,
            compressor_out_isentropic_h,
            condenser_out,
            compressor_out_h: x[2] * H_SCALE,
            p_cond: p_cond.value,
            mass_flow: x[3],
        })
    }

    fn residuals(&self, spec: &BoundarySpec, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let pt = self.evaluate(spec, x)?;
        let h2 = pt.evaporator_out.enthalpy();
        let h3 = pt.compressor_out_h;
        let h4 = pt.condenser_out.enthalpy();
        let duty = spec.sink.duty.value;

        Ok(DVector::from_vec(vec![
            pt.evaporator_out.temperature().value - spec.evaporation_target().value,
            pt.condenser_out.temperature().value - spec.condensation_target().value,
            (spec.compressor_efficiency * (h3 - h2) - (pt.compressor_out_isentropic_h - h2))
                / EFFICIENCY_RESIDUAL_SCALE,
            (pt.mass_flow * (h3 - h4) - duty) / duty,
        ]))
    }

    fn assemble(
        &self,
        topology: &Topology,
        spec: &BoundarySpec,
        x: &DVector<f64>,
        status: SolveStatus,
        diagnostics: SolveDiagnostics,
    ) -> SolverResult<SolveState> {
        let pt = self.evaluate(spec, x)?;
        let h2 = pt.evaporator_out.enthalpy();
        let h4 = pt.condenser_out.enthalpy();

        let compressor_out = self.state(StateInput::PH {
            p: pa(pt.p_cond),
            h: pt.compressor_out_h,
        })?;
        // Isenthalpic throttling back down to the evaporating pressure.
        let valve_out = self.state(StateInput::PH {
            p: pt.evaporator_out.pressure(),
            h: h4,
        })?;

        let nodes = ComponentRole::LOOP_ORDER
            .into_iter()
            .zip(topology.loop_nodes())
            .map(|(role, node)| {
                let state = match role {
                    ComponentRole::FlowCloser | ComponentRole::SourceHeatExchanger => valve_out,
                    ComponentRole::Compressor => pt.evaporator_out,
                    ComponentRole::SinkHeatExchanger => compressor_out,
                    ComponentRole::Throttle => pt.condenser_out,
                };
                NodeState {
                    node,
                    name: topology.node_name(node).to_string(),
                    state,
                }
            })
            .collect();

        let m = pt.mass_flow;
        let evaporator_duty = watt(m * (h2 - h4));
        let condenser_duty = watt(m * (pt.compressor_out_h - h4));
        let performance = CyclePerformance {
            refrigerant_mass_flow: kgps(m),
            compressor_power: watt(m * (pt.compressor_out_h - h2)),
            evaporator_duty,
            condenser_duty,
            source_mass_flow: secondary_flow(
                evaporator_duty,
                spec.source.medium.cp(),
                spec.source.cooling.value,
            ),
            sink_mass_flow: secondary_flow(
                condenser_duty,
                spec.sink.medium.cp(),
                temperature_rise(spec.sink.inlet_temperature, spec.sink.outlet_temperature),
            ),
        };

        Ok(SolveState::new(status, nodes, performance, diagnostics))
    }
}

fn temperature_rise(inlet: Temperature, outlet: Temperature) -> f64 {
    outlet.value - inlet.value
}

fn secondary_flow(duty: Power, cp: f64, delta_t: f64) -> MassRate {
    kgps(duty.value / (cp * delta_t))
}

impl<M: FluidModel> NetworkSolver for CycleSolver<M> {
    fn solve(
        &self,
        topology: &Topology,
        spec: &BoundarySpec,
        seed: Option<&SolveState>,
    ) -> SolverResult<SolveState> {
        spec.check_feasible()?;
        self.check_envelope(spec)?;

        let seeded = seed.and_then(|s| Self::seed_vector(topology, s));
        let warm_start = seeded.is_some();
        let x0 = match seeded {
            Some(x) => x,
            None => self.initial_guess(spec)?,
        };
        debug!(
            fluid = self.fluid.name(),
            warm_start,
            t_evap_target_c = to_degc(spec.evaporation_target()),
            t_cond_target_c = to_degc(spec.condensation_target()),
            "solving cycle"
        );

        let result = newton_solve(
            x0,
            |x| self.residuals(spec, x),
            Self::admissible,
            &self.config,
        )?;

        let status = if result.converged {
            SolveStatus::Converged
        } else {
            SolveStatus::NotConverged
        };
        let diagnostics = SolveDiagnostics {
            iterations: result.iterations,
            residual_norm: result.residual_norm,
        };
        let state = self.assemble(topology, spec, &result.x, status, diagnostics)?;

        debug!(
            ?status,
            iterations = result.iterations,
            residual_norm = result.residual_norm,
            "cycle solve finished"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SecondaryMedium, SinkBoundary, SourceBoundary};
    use hp_core::units::{degc, delta_k, kw, to_kw};
    use hp_fluids::WaterModel;

    fn design() -> BoundarySpec {
        BoundarySpec::new(
            SourceBoundary {
                medium: SecondaryMedium::Air,
                inlet_temperature: degc(40.0),
                outlet_temperature: degc(10.0),
                cooling: delta_k(2.0),
                nominal_duty: kw(1000.0),
            },
            SinkBoundary {
                medium: SecondaryMedium::Water,
                inlet_temperature: degc(40.0),
                outlet_temperature: degc(90.0),
                duty: kw(1012.0),
            },
            0.85,
        )
    }

    #[test]
    fn initial_guess_is_admissible() {
        let solver = CycleSolver::new(WaterModel::new());
        let x0 = solver.initial_guess(&design()).unwrap();
        assert!(CycleSolver::<WaterModel>::admissible(&x0));
        assert!(x0[3] > 0.0);
    }

    #[test]
    fn design_point_hits_saturation_targets() {
        let topo = Topology::heat_pump().unwrap();
        let solver = CycleSolver::new(WaterModel::new());
        let state = solver.solve(&topo, &design(), None).unwrap();

        assert!(state.is_converged());
        let evap_out = state
            .node(topo.outlet_node(ComponentRole::SourceHeatExchanger))
            .unwrap();
        let cond_out = state
            .node(topo.outlet_node(ComponentRole::SinkHeatExchanger))
            .unwrap();
        assert!((to_degc(evap_out.state.temperature()) - 35.0).abs() < 1e-3);
        assert!((to_degc(cond_out.state.temperature()) - 95.0).abs() < 1e-3);
        assert!((to_kw(state.performance().condenser_duty) - 1012.0).abs() < 1e-2);
    }

    #[test]
    fn warm_start_from_solution_converges_immediately() {
        let topo = Topology::heat_pump().unwrap();
        let solver = CycleSolver::new(WaterModel::new());
        let first = solver.solve(&topo, &design(), None).unwrap();
        let again = solver.solve(&topo, &design(), Some(&first)).unwrap();

        assert!(again.is_converged());
        assert!(again.diagnostics().iterations <= 1);
    }

    #[test]
    fn iteration_cap_yields_not_converged_state() {
        let topo = Topology::heat_pump().unwrap();
        let config = NewtonConfig {
            max_iterations: 1,
            ..NewtonConfig::default()
        };
        let solver = CycleSolver::with_config(WaterModel::new(), config);
        let state = solver.solve(&topo, &design(), None).unwrap();
        assert_eq!(state.status(), SolveStatus::NotConverged);
    }

    #[test]
    fn supercritical_sink_is_infeasible() {
        let topo = Topology::heat_pump().unwrap();
        let solver = CycleSolver::new(WaterModel::new());
        let mut spec = design();
        spec.sink.outlet_temperature = degc(400.0);
        let err = solver.solve(&topo, &spec, None).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible { .. }));
    }
}
