//! hp-core: stable foundation for the heat pump workspace.
//!
//! Contains:
//! - units (uom SI types + constructors, Celsius/kW helpers)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for graph objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HpError, HpResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
