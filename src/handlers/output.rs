// ABOUTME: Output handlers: file save, webhook delivery, and document export
// ABOUTME: These are the terminal side effects of a workflow run

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize, Default)]
struct SaveFileConfig {
    #[serde(default)]
    path: Option<String>,
}

pub struct SaveFileHandler;

#[async_trait]
impl NodeHandler for SaveFileHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: SaveFileConfig = match parse_config("save_file", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let data = match node.input_value("data") {
            Some(data) => data.clone(),
            None => {
                return ExecutionResult::failure(format!(
                    "save_file node '{}' has no data input",
                    node.id
                ))
            }
        };

        let path = config.path.unwrap_or_else(|| {
            std::env::temp_dir()
                .join(format!("nodeflow-{}.json", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned()
        });

        let contents = match &data {
            Value::String(s) => s.clone(),
            other => match serde_json::to_string_pretty(other) {
                Ok(contents) => contents,
                Err(e) => {
                    return ExecutionResult::failure(format!("Failed to serialize data: {}", e))
                }
            },
        };

        if let Err(e) = tokio::fs::write(&path, contents).await {
            return ExecutionResult::failure(format!("Failed to write {}: {}", path, e));
        }

        info!("Save node {} wrote {}", node.id, path);
        ExecutionResult::single("file", json!({ "path": path }))
    }

    fn node_type(&self) -> &'static str {
        "save_file"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: SaveFileConfig = parse_config("save_file", config)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookConfig {
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
}

pub struct WebhookHandler {
    client: reqwest::Client,
}

impl WebhookHandler {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for WebhookHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeHandler for WebhookHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: WebhookConfig = match parse_config("webhook", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let payload = match node.input_value("payload") {
            Some(payload) => payload.clone(),
            None => {
                return ExecutionResult::failure(format!(
                    "webhook node '{}' has no payload input",
                    node.id
                ))
            }
        };

        info!("Webhook node {} posting to {}", node.id, config.url);

        let mut request = self.client.post(&config.url).json(&payload);
        for (key, value) in &config.headers {
            request = request.header(key, value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return ExecutionResult::failure(format!("Webhook delivery failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return ExecutionResult::failure(format!(
                "Webhook returned status {}",
                status.as_u16()
            ));
        }
        ExecutionResult::single("status", json!(status.as_u16()))
    }

    fn node_type(&self) -> &'static str {
        "webhook"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let config: WebhookConfig = parse_config("webhook", config)?;
        if config.url.is_empty() {
            return Err(GraphError::InvalidConfig {
                node_type: "webhook".to_string(),
                message: "url cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ExportConfig {
    #[serde(default)]
    pretty: bool,
}

pub struct ExportHandler;

#[async_trait]
impl NodeHandler for ExportHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: ExportConfig = match parse_config("export", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let data = match node.input_value("data") {
            Some(data) => data,
            None => {
                return ExecutionResult::failure(format!(
                    "export node '{}' has no data input",
                    node.id
                ))
            }
        };

        let document = if config.pretty {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        match document {
            Ok(document) => ExecutionResult::single("document", json!(document)),
            Err(e) => ExecutionResult::failure(format!("Failed to serialize data: {}", e)),
        }
    }

    fn node_type(&self) -> &'static str {
        "export"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let _: ExportConfig = parse_config("export", config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Port, PortType};
    use tokio_util::sync::CancellationToken;

    fn context() -> ExecutionContext {
        ExecutionContext::new("run-test", CancellationToken::new())
    }

    fn node_with_data(node_type: &str, input_name: &str, data: Value) -> Node {
        let mut node = Node::new("o", node_type);
        node.inputs
            .push(Port::input(input_name, input_name, PortType::Any, true));
        node.input_mut(input_name).unwrap().value = Some(data);
        node
    }

    #[tokio::test]
    async fn test_save_file_writes_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut node = node_with_data("save_file", "data", json!("payload"));
        node.config
            .insert("path".to_string(), json!(path.to_string_lossy()));

        let result = SaveFileHandler.execute(&node, &context()).await;
        assert!(result.success);
        assert_eq!(
            result.output("file").unwrap()["path"],
            json!(path.to_string_lossy())
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_save_file_without_path_picks_one() {
        let node = node_with_data("save_file", "data", json!({ "k": 1 }));
        let result = SaveFileHandler.execute(&node, &context()).await;

        assert!(result.success);
        let path = result.output("file").unwrap()["path"].as_str().unwrap();
        assert!(!path.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_export_pretty_and_compact() {
        let node = node_with_data("export", "data", json!({ "a": 1 }));
        let result = ExportHandler.execute(&node, &context()).await;
        assert_eq!(result.output("document"), Some(&json!("{\"a\":1}")));

        let mut node = node_with_data("export", "data", json!({ "a": 1 }));
        node.config.insert("pretty".to_string(), json!(true));
        let result = ExportHandler.execute(&node, &context()).await;
        assert!(result.output("document").unwrap().as_str().unwrap().contains('\n'));
    }

    #[tokio::test]
    async fn test_webhook_requires_url_and_payload() {
        let handler = WebhookHandler::new();
        assert!(handler.validate_config(&Map::new()).is_err());

        let mut node = Node::new("w", "webhook");
        node.config
            .insert("url".to_string(), json!("http://127.0.0.1:1/hook"));
        let result = handler.execute(&node, &context()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("no payload"));
    }

    #[tokio::test]
    async fn test_webhook_unreachable_host_is_a_handler_error() {
        let mut node = node_with_data("webhook", "payload", json!({ "event": "done" }));
        node.config
            .insert("url".to_string(), json!("http://127.0.0.1:1/hook"));

        let result = WebhookHandler::new().execute(&node, &context()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Webhook delivery failed"));
    }
}
