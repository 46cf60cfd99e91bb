//! Core graph data structures.

use std::fmt;

use hp_core::{CompId, NodeId, PortId};
use serde::{Deserialize, Serialize};

/// Direction/kind of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Inlet port (upstream connection).
    Inlet,
    /// Outlet port (downstream connection).
    Outlet,
}

/// Functional role of a component in the vapor-compression loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRole {
    /// Evaporator: takes heat from the source stream.
    SourceHeatExchanger,
    Compressor,
    /// Condenser: rejects heat into the sink stream.
    SinkHeatExchanger,
    /// Expansion valve.
    Throttle,
    /// Breaks the algebraic loop so the cycle has a well-defined start.
    FlowCloser,
}

impl ComponentRole {
    /// Roles in working-fluid flow order, starting after the cycle closer.
    pub const LOOP_ORDER: [ComponentRole; 5] = [
        ComponentRole::FlowCloser,
        ComponentRole::SourceHeatExchanger,
        ComponentRole::Compressor,
        ComponentRole::SinkHeatExchanger,
        ComponentRole::Throttle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentRole::SourceHeatExchanger => "source_heat_exchanger",
            ComponentRole::Compressor => "compressor",
            ComponentRole::SinkHeatExchanger => "sink_heat_exchanger",
            ComponentRole::Throttle => "throttle",
            ComponentRole::FlowCloser => "flow_closer",
        }
    }

    /// Position in [`ComponentRole::LOOP_ORDER`].
    pub(crate) fn loop_slot(self) -> usize {
        match self {
            ComponentRole::FlowCloser => 0,
            ComponentRole::SourceHeatExchanger => 1,
            ComponentRole::Compressor => 2,
            ComponentRole::SinkHeatExchanger => 3,
            ComponentRole::Throttle => 4,
        }
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A working-fluid connection point (a state point of the cycle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
}

/// A port connects a component to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub comp: CompId,
    pub node: NodeId,
    pub kind: PortKind,
}

/// A device in the loop. Each component has exactly one inlet and one outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: CompId,
    pub name: String,
    pub role: ComponentRole,
    /// [inlet_port_id, outlet_port_id]
    pub ports: [PortId; 2],
}

impl Component {
    pub fn inlet(&self) -> PortId {
        self.ports[0]
    }

    pub fn outlet(&self) -> PortId {
        self.ports[1]
    }
}

/// A validated, immutable collection of nodes, components, and ports.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) components: Vec<Component>,
    pub(crate) ports: Vec<Port>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get a component by ID (returns None if ID out of bounds).
    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id.slot())
    }

    /// Get a port by ID (returns None if ID out of bounds).
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot())
    }

    /// Components carrying the given role, in insertion order.
    pub fn components_with_role(
        &self,
        role: ComponentRole,
    ) -> impl Iterator<Item = &Component> + '_ {
        self.components.iter().filter(move |c| c.role == role)
    }

    pub fn comp_inlet_node(&self, comp_id: CompId) -> Option<NodeId> {
        let comp = self.component(comp_id)?;
        Some(self.port(comp.inlet())?.node)
    }

    pub fn comp_outlet_node(&self, comp_id: CompId) -> Option<NodeId> {
        let comp = self.component(comp_id)?;
        Some(self.port(comp.outlet())?.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_core::Id;

    #[test]
    fn component_accessors() {
        let comp = Component {
            id: Id::from_index(0),
            name: "compressor".into(),
            role: ComponentRole::Compressor,
            ports: [Id::from_index(10), Id::from_index(11)],
        };
        assert_eq!(comp.inlet().index(), 10);
        assert_eq!(comp.outlet().index(), 11);
    }

    #[test]
    fn loop_slots_match_loop_order() {
        for (i, role) in ComponentRole::LOOP_ORDER.iter().enumerate() {
            assert_eq!(role.loop_slot(), i);
        }
    }

    #[test]
    fn role_display_is_snake_case() {
        assert_eq!(
            ComponentRole::SourceHeatExchanger.to_string(),
            "source_heat_exchanger"
        );
        assert_eq!(ComponentRole::FlowCloser.to_string(), "flow_closer");
    }
}
