// ABOUTME: Speech handlers: audio transcription and speech synthesis
// ABOUTME: Both simulate one external model call per invocation

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize)]
struct SpeechConfig {
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    latency_ms: u64,
}

fn default_model() -> String {
    "default".to_string()
}

pub struct SpeechToTextHandler;

#[async_trait]
impl NodeHandler for SpeechToTextHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: SpeechConfig = match parse_config("speech_to_text", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let audio = match node.input_value("audio") {
            Some(audio) => audio.clone(),
            None => {
                return ExecutionResult::failure(format!(
                    "speech_to_text node '{}' has no audio input",
                    node.id
                ))
            }
        };

        info!("Transcribing audio for node {} with {}", node.id, config.model);
        if config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.latency_ms)).await;
        }

        let source = audio
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("inline audio");
        let transcript = format!(
            "[transcript:{}:{}] {}",
            config.model,
            config.language.as_deref().unwrap_or("auto"),
            source
        );
        ExecutionResult::single("text", json!(transcript))
    }

    fn node_type(&self) -> &'static str {
        "speech_to_text"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: SpeechConfig = parse_config("speech_to_text", config)?;
        Ok(())
    }
}

pub struct TextToSpeechHandler;

#[async_trait]
impl NodeHandler for TextToSpeechHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: SpeechConfig = match parse_config("text_to_speech", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let text = match node.input_value("text") {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(other) => other.to_string(),
            None => {
                return ExecutionResult::failure(format!(
                    "text_to_speech node '{}' has no text input",
                    node.id
                ))
            }
        };

        info!("Synthesizing speech for node {} with {}", node.id, config.model);
        if config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.latency_ms)).await;
        }

        ExecutionResult::single(
            "audio",
            json!({
                "media": "audio",
                "assetId": uuid::Uuid::new_v4().to_string(),
                "model": config.model,
                "voice": config.voice.as_deref().unwrap_or("neutral"),
                "text": text,
            }),
        )
    }

    fn node_type(&self) -> &'static str {
        "text_to_speech"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: SpeechConfig = parse_config("text_to_speech", config)?;
        Ok(())
    }
}
