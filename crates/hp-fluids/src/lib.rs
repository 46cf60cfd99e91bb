//! hp-fluids: working-fluid property backend for the heat pump workspace.
//!
//! Provides:
//! - Thermodynamic state representation (`ThermoState`, `StateInput`)
//! - `FluidModel` trait for equation-of-state lookups
//! - A correlation-based water model (`WaterModel`) valid over the whole
//!   subcritical saturation range
//!
//! # Architecture
//!
//! The network solver only ever talks to `FluidModel`, so any other property
//! library can be dropped in behind the same trait.
//!
//! # Example
//!
//! ```
//! use hp_fluids::{FluidModel, StateInput, WaterModel};
//! use hp_core::units::degc;
//!
//! let water = WaterModel::new();
//! let sat = water.state(StateInput::TQ { t: degc(100.0), x: 1.0 }).unwrap();
//! assert!((sat.pressure().value - 101_418.0).abs() < 500.0);
//! ```

pub mod error;
pub mod model;
pub mod state;
pub mod water;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use model::FluidModel;
pub use state::{SpecEnthalpy, SpecEntropy, StateInput, ThermoState};
pub use water::WaterModel;
