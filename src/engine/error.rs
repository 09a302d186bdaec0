// ABOUTME: Error types for workflow execution engine operations
// ABOUTME: Validation failures are fatal to a run; handler failures are per-node

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Workflow validation failed:\n{}", errors.join("\n"))]
    ValidationFailed { errors: Vec<String> },

    #[error("Circular dependency detected: {nodes:?}")]
    CircularDependency { nodes: Vec<String> },

    #[error("Graph error: {0}")]
    GraphError(#[from] crate::model::GraphError),
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
