// ABOUTME: Project (graph) container holding nodes and edges for one workflow
// ABOUTME: Structural mutators enforce fan-in limits and run-time freezing

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edge::Edge;
use super::error::{GraphError, Result};
use super::node::Node;
use super::port::{NodeId, PortId};

/// The full set of nodes and edges describing one workflow.
///
/// The project is conceptually frozen for the duration of one workflow run:
/// the scheduler is the sole writer of node status/values while `frozen` is
/// set, and every structural mutator fails fast with `GraphError::Frozen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(skip)]
    frozen: bool,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            frozen: false,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Edges originating at the given node.
    pub fn edges_from(&self, node_id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.source_node_id == node_id)
            .collect()
    }

    /// Edges terminating at the given node.
    pub fn edges_into(&self, node_id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.target_node_id == node_id)
            .collect()
    }

    /// The edge feeding a specific input port, if any.
    pub fn edge_into_input(&self, node_id: &str, input_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.targets(node_id, input_id))
    }

    /// Whether the project is currently frozen by an in-progress run.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the project for the duration of a run. Returns an error if a
    /// run already holds the freeze.
    pub fn freeze(&mut self) -> Result<()> {
        if self.frozen {
            return Err(GraphError::Frozen);
        }
        self.frozen = true;
        Ok(())
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Clear per-run bookkeeping ahead of a whole-graph run: node statuses,
    /// output values, and previously propagated (edge-fed) input values.
    /// Literal values on unconnected inputs are kept. Called by the
    /// scheduler after freezing, so it bypasses the edit check.
    pub fn reset_run_state(&mut self) {
        for node in &mut self.nodes {
            node.reset();
            for port in &mut node.inputs {
                if port.connected {
                    port.value = None;
                }
            }
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.frozen {
            return Err(GraphError::Frozen);
        }
        Ok(())
    }

    /// Add a node. Node ids must be unique within the project.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.ensure_editable()?;
        if self.node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode { node_id: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node together with every edge referencing it. Downstream
    /// inputs fed by the removed node are disconnected and reset to idle.
    pub fn remove_node(&mut self, node_id: &str) -> Result<Node> {
        self.ensure_editable()?;
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.to_string(),
            })?;

        let removed_edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.source_node_id == node_id || e.target_node_id == node_id)
            .cloned()
            .collect();
        self.edges
            .retain(|e| e.source_node_id != node_id && e.target_node_id != node_id);

        for edge in &removed_edges {
            if edge.source_node_id == node_id {
                if let Some(target) = self.node_mut(&edge.target_node_id) {
                    if let Some(port) = target.input_mut(&edge.target_input_id) {
                        port.disconnect();
                        port.value = None;
                    }
                    target.reset();
                }
            }
        }

        Ok(self.nodes.remove(index))
    }

    /// Connect an output port to an input port.
    ///
    /// Rejects dangling node/port references, wrong port direction, and a
    /// second edge into an already-targeted input. A type mismatch between
    /// the two ports does not block the connection; it is returned as an
    /// advisory warning for the caller to surface.
    pub fn add_edge(&mut self, edge: Edge) -> Result<Vec<String>> {
        self.ensure_editable()?;

        if self.edge(&edge.id).is_some() {
            return Err(GraphError::DuplicateEdge { edge_id: edge.id });
        }

        let source_type = {
            let source = self.node(&edge.source_node_id).ok_or_else(|| {
                GraphError::NodeNotFound {
                    node_id: edge.source_node_id.clone(),
                }
            })?;
            if source.input(&edge.source_output_id).is_some()
                && source.output(&edge.source_output_id).is_none()
            {
                return Err(GraphError::WrongPortDirection {
                    node_id: edge.source_node_id.clone(),
                    port_id: edge.source_output_id.clone(),
                    expected: "output",
                });
            }
            source
                .output(&edge.source_output_id)
                .ok_or_else(|| GraphError::PortNotFound {
                    node_id: edge.source_node_id.clone(),
                    port_id: edge.source_output_id.clone(),
                })?
                .port_type
        };

        let target_type = {
            let target = self.node(&edge.target_node_id).ok_or_else(|| {
                GraphError::NodeNotFound {
                    node_id: edge.target_node_id.clone(),
                }
            })?;
            if target.output(&edge.target_input_id).is_some()
                && target.input(&edge.target_input_id).is_none()
            {
                return Err(GraphError::WrongPortDirection {
                    node_id: edge.target_node_id.clone(),
                    port_id: edge.target_input_id.clone(),
                    expected: "input",
                });
            }
            target
                .input(&edge.target_input_id)
                .ok_or_else(|| GraphError::PortNotFound {
                    node_id: edge.target_node_id.clone(),
                    port_id: edge.target_input_id.clone(),
                })?
                .port_type
        };

        if self
            .edge_into_input(&edge.target_node_id, &edge.target_input_id)
            .is_some()
        {
            return Err(GraphError::InputAlreadyConnected {
                node_id: edge.target_node_id.clone(),
                input_id: edge.target_input_id.clone(),
            });
        }

        let mut warnings = Vec::new();
        if !source_type.is_compatible_with(&target_type) {
            warnings.push(format!(
                "Type mismatch on edge {}: {}:{} ({}) -> {}:{} ({})",
                edge.id,
                edge.source_node_id,
                edge.source_output_id,
                source_type,
                edge.target_node_id,
                edge.target_input_id,
                target_type,
            ));
        }

        let (target_node_id, target_input_id) =
            (edge.target_node_id.clone(), edge.target_input_id.clone());
        let (source_node_id, source_output_id) =
            (edge.source_node_id.clone(), edge.source_output_id.clone());
        self.edges.push(edge);

        let target = self
            .node_mut(&target_node_id)
            .expect("target existence checked above");
        let port = target
            .input_mut(&target_input_id)
            .expect("target port existence checked above");
        port.connected = true;
        port.source_node_id = Some(source_node_id);
        port.source_output_id = Some(source_output_id);
        target.reset();

        Ok(warnings)
    }

    /// Remove an edge and disconnect its target input.
    pub fn remove_edge(&mut self, edge_id: &str) -> Result<Edge> {
        self.ensure_editable()?;
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound {
                edge_id: edge_id.to_string(),
            })?;
        let edge = self.edges.remove(index);

        if let Some(target) = self.node_mut(&edge.target_node_id) {
            if let Some(port) = target.input_mut(&edge.target_input_id) {
                port.disconnect();
                port.value = None;
            }
            target.reset();
        }

        Ok(edge)
    }

    /// Set a literal value on an input port. This is a structural edit: the
    /// node re-enters idle so the next run picks up the new value.
    pub fn set_input_value(
        &mut self,
        node_id: &str,
        input_id: &str,
        value: Value,
    ) -> Result<()> {
        self.ensure_editable()?;
        let node = self
            .node_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.to_string(),
            })?;
        let port = node
            .input_mut(input_id)
            .ok_or_else(|| GraphError::PortNotFound {
                node_id: node_id.to_string(),
                port_id: input_id.to_string(),
            })?;
        port.value = Some(value);
        node.reset();
        Ok(())
    }

    /// Update a config entry on a node. Also a structural edit.
    pub fn set_config_value(&mut self, node_id: &str, key: &str, value: Value) -> Result<()> {
        self.ensure_editable()?;
        let node = self
            .node_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.to_string(),
            })?;
        node.config.insert(key.to_string(), value);
        node.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::NodeStatus;
    use crate::model::port::{Port, PortType};
    use serde_json::json;

    fn text_node(id: &str) -> Node {
        let mut node = Node::new(id, "text_input");
        node.outputs.push(Port::output("text", "Text", PortType::Text));
        node
    }

    fn sink_node(id: &str) -> Node {
        let mut node = Node::new(id, "save_file");
        node.inputs.push(Port::input("data", "Data", PortType::Any, true));
        node
    }

    #[test]
    fn test_add_edge_connects_target_input() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        project.add_node(sink_node("b")).unwrap();

        let warnings = project
            .add_edge(Edge::new("e1", "a", "text", "b", "data"))
            .unwrap();
        assert!(warnings.is_empty());

        let port = project.node("b").unwrap().input("data").unwrap();
        assert!(port.connected);
        assert_eq!(port.source_node_id.as_deref(), Some("a"));
        assert_eq!(port.source_output_id.as_deref(), Some("text"));
    }

    #[test]
    fn test_fan_in_rejected() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        project.add_node(text_node("c")).unwrap();
        project.add_node(sink_node("b")).unwrap();

        project
            .add_edge(Edge::new("e1", "a", "text", "b", "data"))
            .unwrap();
        let err = project
            .add_edge(Edge::new("e2", "c", "text", "b", "data"))
            .unwrap_err();
        assert!(matches!(err, GraphError::InputAlreadyConnected { .. }));
    }

    #[test]
    fn test_type_mismatch_is_advisory() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        let mut b = Node::new("b", "image_preview");
        b.inputs.push(Port::input("image", "Image", PortType::Image, true));
        project.add_node(b).unwrap();

        let warnings = project
            .add_edge(Edge::new("e1", "a", "text", "b", "image"))
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Type mismatch"));
        assert_eq!(project.edges.len(), 1);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        project.add_node(sink_node("b")).unwrap();
        project
            .add_edge(Edge::new("e1", "a", "text", "b", "data"))
            .unwrap();

        project.remove_node("a").unwrap();
        assert!(project.edges.is_empty());
        let port = project.node("b").unwrap().input("data").unwrap();
        assert!(!port.connected);
    }

    #[test]
    fn test_frozen_rejects_edits() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        project.freeze().unwrap();

        assert!(matches!(
            project.add_node(text_node("b")),
            Err(GraphError::Frozen)
        ));
        assert!(matches!(
            project.set_input_value("a", "x", json!(1)),
            Err(GraphError::Frozen)
        ));

        project.unfreeze();
        project.add_node(text_node("b")).unwrap();
    }

    #[test]
    fn test_reset_run_state_clears_propagated_values_only() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        let mut b = sink_node("b");
        b.inputs
            .push(Port::input("note", "Note", PortType::Text, false));
        project.add_node(b).unwrap();
        project
            .add_edge(Edge::new("e1", "a", "text", "b", "data"))
            .unwrap();
        project.set_input_value("b", "note", json!("literal")).unwrap();

        // simulate a completed run
        project.node_mut("a").unwrap().mark_success();
        project.node_mut("a").unwrap().output_mut("text").unwrap().value = Some(json!("hi"));
        project.node_mut("b").unwrap().input_mut("data").unwrap().value = Some(json!("hi"));
        project.node_mut("b").unwrap().mark_success();

        project.reset_run_state();

        let a = project.node("a").unwrap();
        assert_eq!(a.status, NodeStatus::Idle);
        assert_eq!(a.output("text").unwrap().value, None);
        let b = project.node("b").unwrap();
        // the edge-fed value is gone, the literal survives
        assert_eq!(b.input("data").unwrap().value, None);
        assert!(b.input("data").unwrap().connected);
        assert_eq!(b.input("note").unwrap().value, Some(json!("literal")));
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut project = Project::new("p1", "test");
        project.add_node(text_node("a")).unwrap();
        let err = project
            .add_edge(Edge::new("e1", "a", "text", "ghost", "data"))
            .unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { .. }));
    }
}
