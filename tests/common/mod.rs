// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a builder for assembling test projects node by node

#![allow(dead_code)]

use serde_json::{json, Value};

use nodeflow::model::{Edge, Node, Port, PortType, Project};

/// Builder assembling a `Project` graph for tests. Edges are added after
/// all nodes, mirroring how snapshots deserialize.
pub struct TestGraphBuilder {
    project: Project,
    pending_edges: Vec<Edge>,
    edge_seq: usize,
}

impl TestGraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            project: Project::new(format!("test-{}", name), name),
            pending_edges: Vec::new(),
            edge_seq: 0,
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.project.add_node(node).expect("duplicate node id");
        self
    }

    /// A text_input node configured with an inline value.
    pub fn add_text_input(self, id: &str, value: &str) -> Self {
        let mut node = Node::new(id, "text_input");
        node.config.insert("value".to_string(), json!(value));
        node.outputs
            .push(Port::output("output", "Output", PortType::Text));
        self.with_node(node)
    }

    /// A text_generation node with a required prompt input.
    pub fn add_text_generation(self, id: &str) -> Self {
        let mut node = Node::new(id, "text_generation");
        node.inputs
            .push(Port::input("prompt", "Prompt", PortType::Text, true));
        node.outputs
            .push(Port::output("output", "Output", PortType::Text));
        self.with_node(node)
    }

    /// A condition node with true/false branch outputs.
    pub fn add_condition(self, id: &str, operator: &str, value: &str) -> Self {
        let mut node = Node::new(id, "condition");
        node.config.insert("operator".to_string(), json!(operator));
        node.config.insert("value".to_string(), json!(value));
        node.inputs
            .push(Port::input("input", "Input", PortType::Any, true));
        node.outputs
            .push(Port::output("true", "True", PortType::Any));
        node.outputs
            .push(Port::output("false", "False", PortType::Any));
        self.with_node(node)
    }

    /// An export node turning its data input into a JSON document.
    pub fn add_export(self, id: &str) -> Self {
        let mut node = Node::new(id, "export");
        node.inputs
            .push(Port::input("data", "Data", PortType::Any, true));
        node.outputs
            .push(Port::output("document", "Document", PortType::Text));
        self.with_node(node)
    }

    /// A save_file node writing its data input to a path.
    pub fn add_save_file(self, id: &str, path: Option<&str>) -> Self {
        let mut node = Node::new(id, "save_file");
        if let Some(path) = path {
            node.config.insert("path".to_string(), json!(path));
        }
        node.inputs
            .push(Port::input("data", "Data", PortType::Any, true));
        node.outputs
            .push(Port::output("file", "File", PortType::Any));
        self.with_node(node)
    }

    /// A node with an unregistered type, for handler-lookup failures.
    pub fn add_unsupported(self, id: &str) -> Self {
        self.with_node(Node::new(id, "antigravity"))
    }

    pub fn connect(
        mut self,
        source_node: &str,
        source_output: &str,
        target_node: &str,
        target_input: &str,
    ) -> Self {
        self.edge_seq += 1;
        self.pending_edges.push(Edge::new(
            format!("e{}", self.edge_seq),
            source_node,
            source_output,
            target_node,
            target_input,
        ));
        self
    }

    pub fn set_input(mut self, node_id: &str, input_id: &str, value: Value) -> Self {
        self.project
            .set_input_value(node_id, input_id, value)
            .expect("unknown node or input");
        self
    }

    pub fn build(mut self) -> Project {
        for edge in std::mem::take(&mut self.pending_edges) {
            self.project.add_edge(edge).expect("invalid test edge");
        }
        self.project
    }
}
