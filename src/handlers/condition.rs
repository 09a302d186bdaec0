// ABOUTME: Condition handler routing its input to exactly one of two outputs
// ABOUTME: The unselected output is omitted, signaling "no data" downstream

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

#[derive(Debug, Clone, Deserialize)]
struct ConditionConfig {
    operator: ConditionOperator,
    #[serde(default)]
    value: Option<String>,
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_comparable_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn evaluate(operator: ConditionOperator, input: &Value, expected: &str) -> bool {
    match operator {
        ConditionOperator::Equals => as_comparable_string(input) == expected,
        ConditionOperator::NotEquals => as_comparable_string(input) != expected,
        ConditionOperator::GreaterThan => match (as_number(input), expected.parse::<f64>()) {
            (Some(left), Ok(right)) => left > right,
            _ => false,
        },
        ConditionOperator::LessThan => match (as_number(input), expected.parse::<f64>()) {
            (Some(left), Ok(right)) => left < right,
            _ => false,
        },
        ConditionOperator::Contains => match input {
            Value::String(s) => s.contains(expected),
            Value::Array(items) => items
                .iter()
                .any(|item| as_comparable_string(item) == expected),
            _ => false,
        },
    }
}

pub struct ConditionHandler;

#[async_trait]
impl NodeHandler for ConditionHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: ConditionConfig = match parse_config("condition", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let input = match node.input_value("input") {
            Some(input) => input.clone(),
            None => {
                return ExecutionResult::failure(format!(
                    "condition node '{}' has no input value",
                    node.id
                ))
            }
        };

        let expected = config.value.unwrap_or_default();
        let branch = evaluate(config.operator, &input, &expected);
        info!(
            "Condition node {} took the {} branch",
            node.id,
            if branch { "true" } else { "false" }
        );

        // Only the selected branch receives the input value.
        let output = if branch { "true" } else { "false" };
        ExecutionResult::single(output, input)
    }

    fn node_type(&self) -> &'static str {
        "condition"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: ConditionConfig = parse_config("condition", config)?;
        Ok(())
    }
}
