// ABOUTME: Edge data structure connecting node output ports to input ports
// ABOUTME: Edges are directed; fan-in limits are enforced by the project

use serde::{Deserialize, Serialize};

use super::port::{NodeId, PortId};

/// A directed connection from one node's output port to another node's
/// input port. An output may fan out to many edges; an input accepts at
/// most one incoming edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_node_id: NodeId,
    pub source_output_id: PortId,
    pub target_node_id: NodeId,
    pub target_input_id: PortId,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_node_id: impl Into<String>,
        source_output_id: impl Into<String>,
        target_node_id: impl Into<String>,
        target_input_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_node_id: source_node_id.into(),
            source_output_id: source_output_id.into(),
            target_node_id: target_node_id.into(),
            target_input_id: target_input_id.into(),
        }
    }

    /// Whether this edge terminates at the given (node, input) pair.
    pub fn targets(&self, node_id: &str, input_id: &str) -> bool {
        self.target_node_id == node_id && self.target_input_id == input_id
    }
}
