//! Incremental graph builder.

use hp_core::{CompId, NodeId, PortId};

use crate::error::GraphResult;
use crate::graph::{Component, ComponentRole, Graph, Node, Port, PortKind};
use crate::validate;

/// Builder for constructing a graph incrementally.
///
/// Use `add_node` and `add_component` to build up the graph,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    components: Vec<Component>,
    ports: Vec<Port>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a component between two nodes.
    ///
    /// Creates the inlet and outlet ports and returns the component ID.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        role: ComponentRole,
        inlet_node: NodeId,
        outlet_node: NodeId,
    ) -> CompId {
        let comp_id = CompId::from_index(self.components.len() as u32);

        let inlet_port = self.push_port(comp_id, inlet_node, PortKind::Inlet);
        let outlet_port = self.push_port(comp_id, outlet_node, PortKind::Outlet);

        self.components.push(Component {
            id: comp_id,
            name: name.into(),
            role,
            ports: [inlet_port, outlet_port],
        });

        comp_id
    }

    fn push_port(&mut self, comp: CompId, node: NodeId, kind: PortKind) -> PortId {
        let id = PortId::from_index(self.ports.len() as u32);
        self.ports.push(Port {
            id,
            comp,
            node,
            kind,
        });
        id
    }

    /// Build and validate the graph, returning an immutable `Graph`.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_structure(&self.nodes, &self.components, &self.ports)?;

        Ok(Graph {
            nodes: self.nodes,
            components: self.components,
            ports: self.ports,
        })
    }
}
