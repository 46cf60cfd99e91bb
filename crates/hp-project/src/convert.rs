//! Conversion from user units to the solver's SI types.

use hp_core::units::{degc, delta_k, kw};
use hp_solver::{BoundarySpec, NewtonConfig, SecondaryMedium, SinkBoundary, SourceBoundary};

use crate::schema::{DesignDef, MediumDef, SolverDef};

impl From<MediumDef> for SecondaryMedium {
    fn from(medium: MediumDef) -> Self {
        match medium {
            MediumDef::Air => SecondaryMedium::Air,
            MediumDef::Water => SecondaryMedium::Water,
        }
    }
}

impl From<&DesignDef> for BoundarySpec {
    fn from(design: &DesignDef) -> Self {
        BoundarySpec {
            source: SourceBoundary {
                medium: design.source.medium.into(),
                inlet_temperature: degc(design.source.inlet_temperature_c),
                outlet_temperature: degc(design.source.outlet_temperature_c),
                cooling: delta_k(design.source.cooling_k),
                nominal_duty: kw(design.source.duty_kw),
            },
            sink: SinkBoundary {
                medium: design.sink.medium.into(),
                inlet_temperature: degc(design.sink.inlet_temperature_c),
                outlet_temperature: degc(design.sink.outlet_temperature_c),
                duty: kw(design.sink.duty_kw),
            },
            compressor_efficiency: design.compressor_efficiency,
            evaporator_ttd: delta_k(design.evaporator_ttd_k),
            condenser_ttd: delta_k(design.condenser_ttd_k),
            evaporator_outlet_quality: design.evaporator_outlet_quality,
            condenser_outlet_quality: design.condenser_outlet_quality,
        }
    }
}

impl From<&SolverDef> for NewtonConfig {
    fn from(def: &SolverDef) -> Self {
        NewtonConfig {
            max_iterations: def.max_iterations,
            abs_tol: def.tolerance,
            max_line_search_iters: def.max_line_search_iters,
            ..NewtonConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SinkDef, SourceDef};
    use hp_core::units::{to_degc, to_kw};

    #[test]
    fn design_converts_to_si() {
        let design = DesignDef {
            source: SourceDef {
                medium: MediumDef::Air,
                inlet_temperature_c: 40.0,
                outlet_temperature_c: 10.0,
                cooling_k: 2.0,
                duty_kw: 1000.0,
            },
            sink: SinkDef {
                medium: MediumDef::Water,
                inlet_temperature_c: 40.0,
                outlet_temperature_c: 90.0,
                duty_kw: 1012.0,
            },
            compressor_efficiency: 0.85,
            evaporator_ttd_k: 5.0,
            condenser_ttd_k: 5.0,
            evaporator_outlet_quality: 1.0,
            condenser_outlet_quality: 0.0,
        };

        let spec = BoundarySpec::from(&design);
        assert!((spec.sink.outlet_temperature.value - 363.15).abs() < 1e-9);
        assert!((to_degc(spec.source.inlet_temperature) - 40.0).abs() < 1e-9);
        assert!((to_kw(spec.sink.duty) - 1012.0).abs() < 1e-9);
        assert_eq!(spec.source.medium, SecondaryMedium::Air);
        spec.check_feasible().unwrap();
    }

    #[test]
    fn solver_settings_map_onto_newton_config() {
        let def = SolverDef {
            max_iterations: 7,
            tolerance: 1e-8,
            max_line_search_iters: 3,
        };
        let cfg = NewtonConfig::from(&def);
        assert_eq!(cfg.max_iterations, 7);
        assert_eq!(cfg.abs_tol, 1e-8);
        assert_eq!(cfg.max_line_search_iters, 3);
    }
}
