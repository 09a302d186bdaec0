// ABOUTME: Merge handler combining up to three inputs by a configured strategy
// ABOUTME: Strategies: shallow object merge, array collection, string concat

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    Object,
    Array,
    Concat,
}

#[derive(Debug, Clone, Deserialize)]
struct MergeConfig {
    #[serde(default = "default_strategy")]
    strategy: MergeStrategy,
    #[serde(default)]
    separator: Option<String>,
}

fn default_strategy() -> MergeStrategy {
    MergeStrategy::Object
}

const INPUT_NAMES: [&str; 3] = ["input_1", "input_2", "input_3"];

pub struct MergeHandler;

#[async_trait]
impl NodeHandler for MergeHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: MergeConfig = match parse_config("merge", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        // Inputs are merged in port order; absent inputs are skipped.
        let values: Vec<Value> = INPUT_NAMES
            .iter()
            .filter_map(|name| node.input_value(name).cloned())
            .collect();

        if values.is_empty() {
            return ExecutionResult::failure(format!(
                "merge node '{}' has no inputs to merge",
                node.id
            ));
        }

        info!(
            "Merge node {} combining {} inputs with {:?} strategy",
            node.id,
            values.len(),
            config.strategy
        );

        let merged = match config.strategy {
            MergeStrategy::Object => {
                let mut merged = Map::new();
                for value in values {
                    match value {
                        Value::Object(map) => merged.extend(map),
                        other => {
                            return ExecutionResult::failure(format!(
                                "merge node '{}' cannot object-merge a {} value",
                                node.id,
                                value_kind(&other)
                            ))
                        }
                    }
                }
                Value::Object(merged)
            }
            MergeStrategy::Array => Value::Array(values),
            MergeStrategy::Concat => {
                let separator = config.separator.unwrap_or_default();
                let parts: Vec<String> = values.iter().map(stringify).collect();
                Value::String(parts.join(&separator))
            }
        };

        ExecutionResult::single("output", merged)
    }

    fn node_type(&self) -> &'static str {
        "merge"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: MergeConfig = parse_config("merge", config)?;
        Ok(())
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Port, PortType};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn context() -> ExecutionContext {
        ExecutionContext::new("run-test", CancellationToken::new())
    }

    fn merge_node(strategy: &str, values: Vec<Option<Value>>) -> Node {
        let mut node = Node::new("m", "merge");
        node.config.insert("strategy".to_string(), json!(strategy));
        for (name, value) in INPUT_NAMES.iter().zip(values) {
            node.inputs
                .push(Port::input(*name, *name, PortType::Any, false));
            node.input_mut(name).unwrap().value = value;
        }
        node
    }

    #[tokio::test]
    async fn test_object_merge_later_keys_win() {
        let node = merge_node(
            "object",
            vec![
                Some(json!({ "a": 1, "b": 1 })),
                Some(json!({ "b": 2 })),
                None,
            ],
        );
        let result = MergeHandler.execute(&node, &context()).await;

        assert!(result.success);
        assert_eq!(result.output("output"), Some(&json!({ "a": 1, "b": 2 })));
    }

    #[tokio::test]
    async fn test_array_merge_preserves_order() {
        let node = merge_node(
            "array",
            vec![Some(json!("x")), None, Some(json!({ "k": true }))],
        );
        let result = MergeHandler.execute(&node, &context()).await;
        assert_eq!(
            result.output("output"),
            Some(&json!(["x", { "k": true }]))
        );
    }

    #[tokio::test]
    async fn test_concat_uses_separator() {
        let mut node = merge_node(
            "concat",
            vec![Some(json!("a")), Some(json!("b")), Some(json!(3))],
        );
        node.config.insert("separator".to_string(), json!(", "));
        let result = MergeHandler.execute(&node, &context()).await;
        assert_eq!(result.output("output"), Some(&json!("a, b, 3")));
    }

    #[tokio::test]
    async fn test_object_merge_rejects_non_object_input() {
        let node = merge_node("object", vec![Some(json!("not an object")), None, None]);
        let result = MergeHandler.execute(&node, &context()).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_no_inputs_fails() {
        let node = merge_node("array", vec![None, None, None]);
        let result = MergeHandler.execute(&node, &context()).await;
        assert!(!result.success);
    }
}
