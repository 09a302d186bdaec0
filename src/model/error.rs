// ABOUTME: Error types for graph model operations
// ABOUTME: Covers structural edit failures, template lookup, and config validation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: String },

    #[error("Duplicate node id: {node_id}")]
    DuplicateNode { node_id: String },

    #[error("Port not found: {port_id} on node {node_id}")]
    PortNotFound { node_id: String, port_id: String },

    #[error("Duplicate edge id: {edge_id}")]
    DuplicateEdge { edge_id: String },

    #[error("Edge not found: {edge_id}")]
    EdgeNotFound { edge_id: String },

    #[error("Input {input_id} on node {node_id} already has an incoming connection")]
    InputAlreadyConnected { node_id: String, input_id: String },

    #[error("Port {port_id} on node {node_id} is not an {expected} port")]
    WrongPortDirection {
        node_id: String,
        port_id: String,
        expected: &'static str,
    },

    #[error("Graph is frozen while a run is in progress")]
    Frozen,

    #[error("Unknown node template: {node_type}")]
    UnknownTemplate { node_type: String },

    #[error("Invalid config for node type {node_type}: {message}")]
    InvalidConfig { node_type: String, message: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
