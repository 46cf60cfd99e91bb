//! hp-graph: component graph for the heat pump workspace.
//!
//! Provides:
//! - Core graph data structures (Node, Component, Port, Graph)
//! - Incremental graph builder with structural validation
//! - `ComponentRole` tags and the closed-loop heat pump `Topology`
//!
//! # Example
//!
//! ```
//! use hp_graph::{ComponentRole, Topology};
//!
//! let topology = Topology::heat_pump().unwrap();
//! assert_eq!(topology.graph().components().len(), 5);
//!
//! // The compressor draws from the evaporator outlet.
//! let evap_out = topology.outlet_node(ComponentRole::SourceHeatExchanger);
//! assert_eq!(topology.inlet_node(ComponentRole::Compressor), evap_out);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod topology;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Component, ComponentRole, Graph, Node, Port, PortKind};
pub use topology::Topology;
