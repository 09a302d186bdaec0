// ABOUTME: Workflow execution engine: dependency planning, scheduling, status reporting
// ABOUTME: Exposes the WorkflowEngine entry points used by UI collaborators

pub mod context;
pub mod dependency;
pub mod error;
pub mod result;
pub mod scheduler;
pub mod status;

pub use context::ExecutionContext;
pub use dependency::DependencyGraph;
pub use error::ExecutionError;
pub use result::ExecutionResult;
pub use scheduler::WorkflowEngine;
pub use status::{StatusCallback, StatusReporter};
