// ABOUTME: Graph data model: ports, nodes, edges, projects, templates, snapshots
// ABOUTME: Also hosts the pre-execution graph validator

pub mod catalog;
pub mod edge;
pub mod error;
pub mod node;
pub mod port;
pub mod project;
pub mod snapshot;
pub mod validation;

pub use catalog::{ConfigField, ConfigKind, NodeTemplate, TemplateCatalog};
pub use edge::Edge;
pub use error::GraphError;
pub use node::{Node, NodeStatus};
pub use port::{NodeId, Port, PortId, PortType};
pub use project::Project;
pub use snapshot::{SnapshotMetadata, WorkflowSnapshot};
pub use validation::{GraphValidator, ValidationReport};
