// ABOUTME: Input handlers for text, image, video, and audio ingestion nodes
// ABOUTME: They emit their configured payload verbatim and never read inputs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize, Default)]
struct InputConfig {
    /// Inline payload (text content, or a data URI for media).
    #[serde(default)]
    value: Option<String>,
    /// Reference to an uploaded asset.
    #[serde(default)]
    source: Option<String>,
}

fn execute_input(node: &Node, node_type: &str, media: &str) -> ExecutionResult {
    let config: InputConfig = match parse_config(node_type, &node.config) {
        Ok(config) => config,
        Err(e) => return ExecutionResult::failure(e.to_string()),
    };

    let payload = match (config.value, config.source) {
        (Some(value), _) => Value::String(value),
        (None, Some(source)) => json!({ "media": media, "source": source }),
        (None, None) => {
            return ExecutionResult::failure(format!(
                "{} node '{}' has neither a value nor a source configured",
                node_type, node.id
            ))
        }
    };

    info!("Input node {} emitting configured {} payload", node.id, media);
    ExecutionResult::single("output", payload)
}

fn validate_input_config(node_type: &str, config: &Map<String, Value>) -> Result<(), GraphError> {
    let _: InputConfig = parse_config(node_type, config)?;
    Ok(())
}

macro_rules! input_handler {
    ($name:ident, $node_type:literal, $media:literal) => {
        pub struct $name;

        #[async_trait]
        impl NodeHandler for $name {
            async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
                execute_input(node, $node_type, $media)
            }

            fn node_type(&self) -> &'static str {
                $node_type
            }

            fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
                validate_input_config($node_type, config)
            }
        }
    };
}

input_handler!(TextInputHandler, "text_input", "text");
input_handler!(ImageInputHandler, "image_input", "image");
input_handler!(VideoInputHandler, "video_input", "video");
input_handler!(AudioInputHandler, "audio_input", "audio");
