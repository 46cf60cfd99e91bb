//! Graph validation logic.

use hp_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, ComponentRole, Graph, Node, Port, PortKind};

/// Validate the graph structure: all references exist and ports are consistent.
pub(crate) fn validate_structure(
    nodes: &[Node],
    components: &[Component],
    ports: &[Port],
) -> GraphResult<()> {
    for port in ports {
        if port.node.slot() >= nodes.len() {
            return Err(GraphError::InvalidNodeRef {
                port: port.id,
                node: port.node,
            });
        }
        if port.comp.slot() >= components.len() {
            return Err(GraphError::InvalidCompRef {
                port: port.id,
                comp: port.comp,
            });
        }
    }

    for comp in components {
        for &port_id in &comp.ports {
            let Some(port) = ports.get(port_id.slot()) else {
                return Err(GraphError::InvalidCompRef {
                    port: port_id,
                    comp: comp.id,
                });
            };
            if port.comp != comp.id {
                return Err(GraphError::PortCompMismatch {
                    port: port_id,
                    expected: comp.id,
                    actual: port.comp,
                });
            }
        }

        let inlet = ports[comp.inlet().slot()].node;
        let outlet = ports[comp.outlet().slot()].node;
        if inlet == outlet {
            return Err(GraphError::SelfLoop {
                comp: comp.id,
                node: inlet,
            });
        }
    }

    Ok(())
}

/// Validate that the graph is a single closed vapor-compression loop.
///
/// Every role appears exactly once, every node joins exactly one upstream
/// and one downstream component, and following the flow from the cycle
/// closer visits the roles in [`ComponentRole::LOOP_ORDER`].
pub(crate) fn validate_heat_pump_loop(graph: &Graph) -> GraphResult<[usize; 5]> {
    let mut by_role = [None; 5];
    for role in ComponentRole::LOOP_ORDER {
        let mut matches = graph.components_with_role(role);
        let first = matches.next();
        let extra = matches.count();
        match first {
            Some(comp) if extra == 0 => by_role[role.loop_slot()] = Some(comp.id.slot()),
            _ => {
                return Err(GraphError::RoleCount {
                    role,
                    count: usize::from(first.is_some()) + extra,
                });
            }
        }
    }
    // All five roles were found exactly once above.
    let by_role = by_role.map(|slot| slot.unwrap_or_default());

    for node in graph.nodes() {
        let (inlets, outlets) = port_degree(graph.ports(), node.id);
        if inlets != 1 || outlets != 1 {
            return Err(GraphError::NodeDegree {
                node: node.id,
                inlets,
                outlets,
            });
        }
    }

    for window in 0..ComponentRole::LOOP_ORDER.len() {
        let after = ComponentRole::LOOP_ORDER[window];
        let expected = ComponentRole::LOOP_ORDER[(window + 1) % 5];
        let comp = &graph.components()[by_role[after.loop_slot()]];
        let downstream = downstream_component(graph, comp);
        if let Some(found) = downstream
            && found.role != expected
        {
            return Err(GraphError::LoopOrder {
                after,
                expected,
                found: found.role,
            });
        }
    }

    Ok(by_role)
}

/// (ports leaving the node into a component inlet, ports arriving from an outlet)
fn port_degree(ports: &[Port], node: NodeId) -> (usize, usize) {
    ports
        .iter()
        .filter(|p| p.node == node)
        .fold((0, 0), |(i, o), p| match p.kind {
            PortKind::Inlet => (i + 1, o),
            PortKind::Outlet => (i, o + 1),
        })
}

fn downstream_component<'g>(graph: &'g Graph, comp: &Component) -> Option<&'g Component> {
    let node = graph.port(comp.outlet())?.node;
    graph
        .ports()
        .iter()
        .find(|p| p.node == node && p.kind == PortKind::Inlet)
        .and_then(|p| graph.component(p.comp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_core::Id;

    #[test]
    fn validate_empty_graph() {
        assert!(validate_structure(&[], &[], &[]).is_ok());
    }

    #[test]
    fn validate_invalid_node_ref() {
        let nodes = vec![Node {
            id: Id::from_index(0),
            name: "N1".into(),
        }];
        let ports = vec![Port {
            id: Id::from_index(0),
            comp: Id::from_index(0),
            node: Id::from_index(99),
            kind: PortKind::Inlet,
        }];

        let result = validate_structure(&nodes, &[], &ports);
        assert!(matches!(result, Err(GraphError::InvalidNodeRef { .. })));
    }

    #[test]
    fn validate_component_port_mismatch() {
        let nodes = vec![
            Node {
                id: Id::from_index(0),
                name: "N1".into(),
            },
            Node {
                id: Id::from_index(1),
                name: "N2".into(),
            },
        ];
        let ports = vec![
            Port {
                id: Id::from_index(0),
                comp: Id::from_index(0),
                node: Id::from_index(0),
                kind: PortKind::Inlet,
            },
            Port {
                id: Id::from_index(1),
                comp: Id::from_index(1),
                node: Id::from_index(1),
                kind: PortKind::Outlet,
            },
        ];
        let components = vec![
            Component {
                id: Id::from_index(0),
                name: "C1".into(),
                role: ComponentRole::Compressor,
                ports: [Id::from_index(0), Id::from_index(1)],
            },
            Component {
                id: Id::from_index(1),
                name: "C2".into(),
                role: ComponentRole::Throttle,
                ports: [Id::from_index(1), Id::from_index(0)],
            },
        ];

        let result = validate_structure(&nodes, &components, &ports);
        assert!(matches!(result, Err(GraphError::PortCompMismatch { .. })));
    }
}
