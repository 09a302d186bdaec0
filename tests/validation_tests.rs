// ABOUTME: Integration tests for graph validation and structural edit rules
// ABOUTME: Covers cycle rejection, fan-in limits, and advisory type warnings

mod common;

use common::TestGraphBuilder;
use nodeflow::model::{Edge, GraphError, GraphValidator, Node, Port, PortType};
use serde_json::json;

#[test]
fn test_valid_chain_passes_validation() {
    let project = TestGraphBuilder::new("chain")
        .add_text_input("a", "hello")
        .add_text_generation("b")
        .add_export("c")
        .connect("a", "output", "b", "prompt")
        .connect("b", "output", "c", "data")
        .build();

    let report = GraphValidator::validate(&project);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
}

#[test]
fn test_cycle_is_reported_with_participants() {
    let mut project = TestGraphBuilder::new("cycle")
        .add_text_generation("a")
        .add_text_generation("b")
        .connect("a", "output", "b", "prompt")
        .build();
    // close the loop manually
    project
        .node_mut("a")
        .unwrap()
        .inputs
        .push(Port::input("seed", "Seed", PortType::Any, false));
    project
        .add_edge(Edge::new("back", "b", "output", "a", "seed"))
        .unwrap();

    let report = GraphValidator::validate(&project);
    assert!(!report.is_valid());
    let cycle_error = report
        .errors
        .iter()
        .find(|e| e.contains("Cycle detected"))
        .expect("cycle error missing");
    assert!(cycle_error.contains('a') && cycle_error.contains('b'));
}

#[test]
fn test_second_edge_into_same_input_is_rejected() {
    let mut project = TestGraphBuilder::new("fan-in")
        .add_text_input("a", "one")
        .add_text_input("b", "two")
        .add_export("c")
        .connect("a", "output", "c", "data")
        .build();

    let err = project
        .add_edge(Edge::new("dup", "b", "output", "c", "data"))
        .unwrap_err();
    assert!(matches!(err, GraphError::InputAlreadyConnected { .. }));
    assert_eq!(project.edges.len(), 1);
}

#[test]
fn test_dangling_edge_endpoints_are_rejected() {
    let mut project = TestGraphBuilder::new("dangling")
        .add_text_input("a", "x")
        .build();

    let err = project
        .add_edge(Edge::new("e", "a", "output", "ghost", "data"))
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound { .. }));
}

#[test]
fn test_port_type_mismatch_is_a_warning_not_an_error() {
    let mut project = TestGraphBuilder::new("mismatch")
        .add_text_input("a", "not audio")
        .build();
    let mut stt = Node::new("s", "speech_to_text");
    stt.inputs
        .push(Port::input("audio", "Audio", PortType::Audio, true));
    stt.outputs.push(Port::output("text", "Text", PortType::Text));
    project.add_node(stt).unwrap();

    let warnings = project
        .add_edge(Edge::new("e", "a", "output", "s", "audio"))
        .unwrap();
    assert!(!warnings.is_empty(), "expected a type mismatch warning");
    assert_eq!(project.edges.len(), 1);

    let report = GraphValidator::validate(&project);
    assert!(report.is_valid());
    assert!(report.warnings.iter().any(|w| w.contains("audio")));
}

#[test]
fn test_any_port_is_compatible_with_everything() {
    let project = TestGraphBuilder::new("any")
        .add_text_input("a", "x")
        .add_export("c")
        .connect("a", "output", "c", "data")
        .build();

    let report = GraphValidator::validate(&project);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_unconnected_required_input_without_literal_is_an_error() {
    let project = TestGraphBuilder::new("missing-input")
        .add_text_generation("b")
        .build();

    let report = GraphValidator::validate(&project);
    assert!(!report.is_valid());
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains('b') && e.contains("prompt")));
}

#[test]
fn test_required_input_satisfied_by_literal_value() {
    let project = TestGraphBuilder::new("literal")
        .add_text_generation("b")
        .set_input("b", "prompt", json!("a prompt set by hand"))
        .build();

    let report = GraphValidator::validate(&project);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
}

#[test]
fn test_structural_edits_rejected_while_frozen() {
    let mut project = TestGraphBuilder::new("frozen")
        .add_text_input("a", "x")
        .add_export("c")
        .connect("a", "output", "c", "data")
        .build();

    project.freeze().unwrap();
    assert!(matches!(
        project.add_node(Node::new("d", "text_input")),
        Err(GraphError::Frozen)
    ));
    assert!(matches!(project.remove_edge("e1"), Err(GraphError::Frozen)));
    assert!(matches!(
        project.set_input_value("c", "data", json!("x")),
        Err(GraphError::Frozen)
    ));

    project.unfreeze();
    assert!(project.add_node(Node::new("d", "text_input")).is_ok());
}

#[test]
fn test_removing_node_cascades_edges_and_disconnects_inputs() {
    let mut project = TestGraphBuilder::new("cascade")
        .add_text_input("a", "x")
        .add_export("c")
        .connect("a", "output", "c", "data")
        .build();

    project.remove_node("a").unwrap();
    assert!(project.edges.is_empty());
    let port = project.node("c").unwrap().input("data").unwrap();
    assert!(!port.connected);
    assert!(port.source_node_id.is_none());
}
