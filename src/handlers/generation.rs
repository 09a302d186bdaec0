// ABOUTME: Simulated AI generation handlers for text, image, video, and audio
// ABOUTME: One external (simulated) model call per invocation; no internal retry

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize)]
struct GenerationConfig {
    #[serde(default = "default_model")]
    model: String,
    /// Simulated model latency; tests leave it at zero.
    #[serde(default)]
    latency_ms: u64,
    /// Clip duration for video/audio generation.
    #[serde(default)]
    duration: Option<f64>,
}

fn default_model() -> String {
    "default".to_string()
}

async fn execute_generation(node: &Node, node_type: &str, media: &str) -> ExecutionResult {
    let config: GenerationConfig = match parse_config(node_type, &node.config) {
        Ok(config) => config,
        Err(e) => return ExecutionResult::failure(e.to_string()),
    };

    let prompt = match node.input_value("prompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => prompt.clone(),
        Some(other) => other.to_string(),
        None => {
            return ExecutionResult::failure(format!(
                "{} node '{}' has no prompt input",
                node_type, node.id
            ))
        }
    };

    info!(
        "Generating {} with model {} for node {}",
        media, config.model, node.id
    );

    if config.latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.latency_ms)).await;
    }

    let asset_id = uuid::Uuid::new_v4().to_string();
    let output = if media == "text" {
        json!(format!("[{}] {}", config.model, prompt))
    } else {
        json!({
            "media": media,
            "assetId": asset_id,
            "model": config.model,
            "prompt": prompt,
            "duration": config.duration,
        })
    };

    ExecutionResult::single("output", output)
}

macro_rules! generation_handler {
    ($name:ident, $node_type:literal, $media:literal) => {
        pub struct $name;

        #[async_trait]
        impl NodeHandler for $name {
            async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
                execute_generation(node, $node_type, $media).await
            }

            fn node_type(&self) -> &'static str {
                $node_type
            }

            fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
                let _: GenerationConfig = parse_config($node_type, config)?;
                Ok(())
            }
        }
    };
}

generation_handler!(TextGenerationHandler, "text_generation", "text");
generation_handler!(ImageGenerationHandler, "image_generation", "image");
generation_handler!(VideoGenerationHandler, "video_generation", "video");
generation_handler!(AudioGenerationHandler, "audio_generation", "audio");
