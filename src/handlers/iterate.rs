// ABOUTME: Loop handler applying a fixed transform to each element of an array
// ABOUTME: Iteration count is capped by config to keep runs bounded

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize)]
struct LoopConfig {
    #[serde(default = "default_max_iterations")]
    max_iterations: usize,
}

fn default_max_iterations() -> usize {
    100
}

pub struct LoopHandler;

#[async_trait]
impl NodeHandler for LoopHandler {
    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> ExecutionResult {
        let config: LoopConfig = match parse_config("loop", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let items = match node.input_value("items") {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return ExecutionResult::failure(format!(
                    "loop node '{}' expects an array input, got {}",
                    node.id,
                    type_name(other)
                ))
            }
            None => {
                return ExecutionResult::failure(format!(
                    "loop node '{}' has no items input",
                    node.id
                ))
            }
        };

        if items.len() > config.max_iterations {
            warn!(
                "Loop node {} truncating {} items to max_iterations={}",
                node.id,
                items.len(),
                config.max_iterations
            );
        }

        let mut results = Vec::with_capacity(items.len().min(config.max_iterations));
        for (index, item) in items.into_iter().take(config.max_iterations).enumerate() {
            if ctx.is_cancelled() {
                return ExecutionResult::failure("loop cancelled".to_string());
            }
            results.push(json!({ "index": index, "item": item }));
        }

        info!("Loop node {} produced {} results", node.id, results.len());
        ExecutionResult::single("results", Value::Array(results))
    }

    fn node_type(&self) -> &'static str {
        "loop"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let config: LoopConfig = parse_config("loop", config)?;
        if config.max_iterations == 0 {
            return Err(GraphError::InvalidConfig {
                node_type: "loop".to_string(),
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
