// ABOUTME: Built-in node handlers and the registry mapping node types to behavior
// ABOUTME: Handlers are stateless: they read resolved input values and config only

pub mod condition;
pub mod generation;
pub mod http;
pub mod input;
pub mod iterate;
pub mod merge;
pub mod output;
pub mod speech;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

/// Behavior for one node type. Handlers read only the node's resolved input
/// values (`node.input_value`) and its config; they never touch the graph.
/// Node-local failures are expressed as `ExecutionResult::failure`, never as
/// a panic or a registry error.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> ExecutionResult;

    fn node_type(&self) -> &'static str;

    /// Validate a config map for this node type. The default accepts
    /// anything; handlers with typed config structs override this.
    fn validate_config(&self, _config: &Map<String, Value>) -> Result<(), GraphError> {
        Ok(())
    }
}

/// Maps a node's declared `type` to its handler. Every built-in is
/// individually replaceable through `register`.
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn NodeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };

        registry.register(Box::new(input::TextInputHandler));
        registry.register(Box::new(input::ImageInputHandler));
        registry.register(Box::new(input::VideoInputHandler));
        registry.register(Box::new(input::AudioInputHandler));
        registry.register(Box::new(generation::TextGenerationHandler));
        registry.register(Box::new(generation::ImageGenerationHandler));
        registry.register(Box::new(generation::VideoGenerationHandler));
        registry.register(Box::new(generation::AudioGenerationHandler));
        registry.register(Box::new(speech::SpeechToTextHandler));
        registry.register(Box::new(speech::TextToSpeechHandler));
        registry.register(Box::new(http::HttpRequestHandler::new()));
        registry.register(Box::new(condition::ConditionHandler));
        registry.register(Box::new(iterate::LoopHandler));
        registry.register(Box::new(merge::MergeHandler));
        registry.register(Box::new(output::SaveFileHandler));
        registry.register(Box::new(output::WebhookHandler::new()));
        registry.register(Box::new(output::ExportHandler));

        registry
    }

    /// Registry with no handlers; useful for tests that register mocks.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn NodeHandler>) {
        self.handlers
            .insert(handler.node_type().to_string(), handler);
    }

    pub fn get(&self, node_type: &str) -> Option<&dyn NodeHandler> {
        self.handlers.get(node_type).map(|h| h.as_ref())
    }

    pub fn supported_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        types.sort();
        types
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize a node's config map into a typed handler config.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    node_type: &str,
    config: &Map<String, Value>,
) -> Result<T, GraphError> {
    serde_json::from_value(Value::Object(config.clone())).map_err(|e| GraphError::InvalidConfig {
        node_type: node_type.to_string(),
        message: e.to_string(),
    })
}
