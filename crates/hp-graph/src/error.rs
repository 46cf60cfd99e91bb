//! Graph-specific error types.

use hp_core::{CompId, HpError, NodeId, PortId};
use thiserror::Error;

use crate::graph::ComponentRole;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A port refers to a node that doesn't exist.
    #[error("Port {port} refers to non-existent node {node}")]
    InvalidNodeRef { port: PortId, node: NodeId },

    /// A port refers to a component that doesn't exist.
    #[error("Port {port} refers to non-existent component {comp}")]
    InvalidCompRef { port: PortId, comp: CompId },

    /// A port's component field doesn't match the component containing it.
    #[error("Port {port} should belong to component {expected} but references {actual}")]
    PortCompMismatch {
        port: PortId,
        expected: CompId,
        actual: CompId,
    },

    /// A component feeds straight back into its own inlet node.
    #[error("Component {comp} connects node {node} to itself")]
    SelfLoop { comp: CompId, node: NodeId },

    /// A role is missing or declared more than once.
    #[error("Role {role} appears {count} times (expected exactly once)")]
    RoleCount { role: ComponentRole, count: usize },

    /// A node does not have exactly one upstream and one downstream component.
    #[error("Node {node} has {inlets} outgoing and {outlets} incoming connections (expected 1 each)")]
    NodeDegree {
        node: NodeId,
        inlets: usize,
        outlets: usize,
    },

    /// Walking the working-fluid loop did not reproduce the expected role order.
    #[error("Loop order broken: expected {expected} after {after}, found {found}")]
    LoopOrder {
        after: ComponentRole,
        expected: ComponentRole,
        found: ComponentRole,
    },
}

impl From<GraphError> for HpError {
    fn from(err: GraphError) -> Self {
        HpError::Invariant {
            what: err.to_string(),
        }
    }
}
