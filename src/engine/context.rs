// ABOUTME: Execution context handed to node handlers
// ABOUTME: Carries run identity, timing, and the run-scoped cancellation token

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Runtime context for one node execution. Handlers read only their node's
/// resolved input values and config; the context adds run identity and the
/// cancellation token so long external calls can bail out early.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub run_id: String,
    pub node_id: String,
    pub started_at: DateTime<Utc>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn new(run_id: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            run_id: run_id.into(),
            node_id: String::new(),
            started_at: Utc::now(),
            cancel,
        }
    }

    /// Derive a context scoped to a single node.
    pub fn for_node(&self, node_id: impl Into<String>) -> Self {
        Self {
            run_id: self.run_id.clone(),
            node_id: node_id.into(),
            started_at: Utc::now(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
