// ABOUTME: Node data structure and per-node status state machine
// ABOUTME: Nodes carry typed ports, free-form config, and run bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::port::{Port, PortId};

/// Per-node execution status.
///
/// `Idle -> Running -> {Success | Error}`; a node returns to `Idle` only
/// through a structural edit (input value changed, node re-added). Nodes
/// skipped because an upstream dependency failed stay `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Success,
    Error,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Idle => write!(f, "idle"),
            NodeStatus::Running => write!(f, "running"),
            NodeStatus::Success => write!(f, "success"),
            NodeStatus::Error => write!(f, "error"),
        }
    }
}

/// A unit of work in the graph: a declared `type` (registry key), typed
/// input/output ports, and free-form config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            config: Map::new(),
            status: NodeStatus::Idle,
            last_error: None,
            last_run_at: None,
        }
    }

    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn input_mut(&mut self, port_id: &str) -> Option<&mut Port> {
        self.inputs.iter_mut().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    pub fn output_mut(&mut self, port_id: &str) -> Option<&mut Port> {
        self.outputs.iter_mut().find(|p| p.id == port_id)
    }

    /// Look up the value of an input port by port id or port name.
    /// Handlers address ports by name; the wire format addresses them by id.
    pub fn input_value(&self, key: &str) -> Option<&Value> {
        self.inputs
            .iter()
            .find(|p| p.id == key || p.name == key)
            .and_then(|p| p.value.as_ref())
    }

    /// Look up a config entry.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Config entry as a string, if present and a string.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }

    pub fn mark_running(&mut self) {
        self.status = NodeStatus::Running;
        self.last_error = None;
        self.last_run_at = Some(Utc::now());
    }

    pub fn mark_success(&mut self) {
        self.status = NodeStatus::Success;
        self.last_error = None;
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = NodeStatus::Error;
        self.last_error = Some(message.into());
    }

    /// Reset run state; used by structural edits and discarded cancellations.
    pub fn reset(&mut self) {
        self.status = NodeStatus::Idle;
        self.last_error = None;
        for port in &mut self.outputs {
            port.value = None;
        }
    }

    /// Ids of required input ports that are neither connected nor hold a
    /// literal value.
    pub fn unsatisfied_required_inputs(&self) -> Vec<PortId> {
        self.inputs
            .iter()
            .filter(|p| p.required && !p.connected && !p.has_value())
            .map(|p| p.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::port::PortType;
    use serde_json::json;

    #[test]
    fn test_status_transitions() {
        let mut node = Node::new("n1", "text_input");
        assert_eq!(node.status, NodeStatus::Idle);

        node.mark_running();
        assert_eq!(node.status, NodeStatus::Running);
        assert!(node.last_run_at.is_some());

        node.mark_error("boom");
        assert_eq!(node.status, NodeStatus::Error);
        assert_eq!(node.last_error.as_deref(), Some("boom"));

        node.reset();
        assert_eq!(node.status, NodeStatus::Idle);
        assert!(node.last_error.is_none());
    }

    #[test]
    fn test_unsatisfied_required_inputs() {
        let mut node = Node::new("n1", "text_generation");
        node.inputs.push(Port::input("prompt", "Prompt", PortType::Text, true));
        node.inputs.push(Port::input("style", "Style", PortType::Text, false));

        assert_eq!(node.unsatisfied_required_inputs(), vec!["prompt".to_string()]);

        node.input_mut("prompt").unwrap().value = Some(json!("draw a cat"));
        assert!(node.unsatisfied_required_inputs().is_empty());
    }

    #[test]
    fn test_node_type_serialized_as_type() {
        let node = Node::new("n1", "merge");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "merge");
        assert_eq!(value["status"], "idle");
    }
}
