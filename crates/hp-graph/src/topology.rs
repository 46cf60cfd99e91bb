//! The fixed heat pump topology.
//!
//! Five components on one working-fluid loop:
//!
//! ```text
//!  c0 -> [cycle closer] -> c1 -> [evaporator] -> c2 -> [compressor]
//!     -> c3 -> [condenser] -> c4 -> [expansion valve] -> c0
//! ```
//!
//! The secondary (source/sink) streams are not part of the graph; they enter
//! only through the boundary specification of the two heat exchangers.

use hp_core::NodeId;

use crate::builder::GraphBuilder;
use crate::error::GraphResult;
use crate::graph::{Component, ComponentRole, Graph};
use crate::validate;

/// Immutable, validated heat pump loop with O(1) role lookups.
#[derive(Debug, Clone)]
pub struct Topology {
    graph: Graph,
    /// Component slot for each role, indexed by loop position.
    by_role: [usize; 5],
}

impl Topology {
    /// Declare the standard single-stage heat pump.
    pub fn heat_pump() -> GraphResult<Self> {
        let mut builder = GraphBuilder::new();
        let c0 = builder.add_node("c0");
        let c1 = builder.add_node("c1");
        let c2 = builder.add_node("c2");
        let c3 = builder.add_node("c3");
        let c4 = builder.add_node("c4");

        builder.add_component("expansion valve", ComponentRole::Throttle, c4, c0);
        builder.add_component("cycle closer", ComponentRole::FlowCloser, c0, c1);
        builder.add_component("evaporator", ComponentRole::SourceHeatExchanger, c1, c2);
        builder.add_component("compressor", ComponentRole::Compressor, c2, c3);
        builder.add_component("condenser", ComponentRole::SinkHeatExchanger, c3, c4);

        Self::from_graph(builder.build()?)
    }

    /// Wrap an arbitrary graph, checking that it forms a valid heat pump loop.
    pub fn from_graph(graph: Graph) -> GraphResult<Self> {
        let by_role = validate::validate_heat_pump_loop(&graph)?;
        Ok(Self { graph, by_role })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The component playing `role`.
    pub fn component(&self, role: ComponentRole) -> &Component {
        &self.graph.components[self.by_role[role.loop_slot()]]
    }

    /// Node feeding the component with `role`.
    pub fn inlet_node(&self, role: ComponentRole) -> NodeId {
        let comp = self.component(role);
        self.graph.ports[comp.inlet().slot()].node
    }

    /// Node leaving the component with `role`.
    pub fn outlet_node(&self, role: ComponentRole) -> NodeId {
        let comp = self.component(role);
        self.graph.ports[comp.outlet().slot()].node
    }

    /// Nodes in flow order, starting at the cycle closer inlet.
    pub fn loop_nodes(&self) -> [NodeId; 5] {
        ComponentRole::LOOP_ORDER.map(|role| self.inlet_node(role))
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        self.graph.node(node).map_or("?", |n| n.name.as_str())
    }
}
