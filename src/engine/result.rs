// ABOUTME: Per-node execution result returned by node handlers
// ABOUTME: Failure results carry no outputs; the scheduler treats all handlers uniformly

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The uniform result contract for node handlers: a success flag, a map of
/// output-port-name to value, and an optional error message. A failed
/// result must leave `outputs` empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub outputs: HashMap<String, Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(outputs: HashMap<String, Value>) -> Self {
        Self {
            success: true,
            outputs,
            error: None,
        }
    }

    /// A success carrying a single named output.
    pub fn single(output: impl Into<String>, value: Value) -> Self {
        let mut outputs = HashMap::new();
        outputs.insert(output.into(), value);
        Self::success(outputs)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            outputs: HashMap::new(),
            error: Some(message.into()),
        }
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }
}
