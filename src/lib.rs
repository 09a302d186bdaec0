// ABOUTME: Main library module for the nodeflow workflow engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod handlers;
pub mod model;

// Re-export commonly used types
pub use cli::{App, Args};
pub use engine::{ExecutionResult, StatusReporter, WorkflowEngine};
pub use handlers::{HandlerRegistry, NodeHandler};
pub use model::{Edge, Node, NodeStatus, Port, PortType, Project, WorkflowSnapshot};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
