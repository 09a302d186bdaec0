// ABOUTME: Status reporting surface exposed to UI collaborators
// ABOUTME: Wraps the per-node status callback; reports are synchronous and per-node ordered

use std::sync::Arc;

use tracing::debug;

use super::result::ExecutionResult;
use crate::model::NodeStatus;

/// Callback invoked on every node status transition. `running` is always
/// reported before `success`/`error` for a given node; callbacks for a
/// single node are strictly ordered, while callbacks across concurrently
/// running nodes may interleave.
pub type StatusCallback = Arc<dyn Fn(&str, NodeStatus, Option<&ExecutionResult>) + Send + Sync>;

/// The observable surface handed to the scheduler. Reports are delivered
/// synchronously from the execution path, never batched.
#[derive(Clone)]
pub struct StatusReporter {
    callback: Option<StatusCallback>,
}

impl StatusReporter {
    /// Reporter that only emits tracing output.
    pub fn noop() -> Self {
        Self { callback: None }
    }

    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&str, NodeStatus, Option<&ExecutionResult>) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn report(&self, node_id: &str, status: NodeStatus, result: Option<&ExecutionResult>) {
        debug!("Node {} -> {}", node_id, status);
        if let Some(callback) = &self.callback {
            callback(node_id, status, result);
        }
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}
