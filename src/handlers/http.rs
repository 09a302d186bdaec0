// ABOUTME: HTTP request handler performing exactly one external call per invocation
// ABOUTME: Network and timeout failures become handler errors; no internal retry

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{parse_config, NodeHandler};
use crate::engine::{ExecutionContext, ExecutionResult};
use crate::model::{GraphError, Node};

#[derive(Debug, Clone, Deserialize)]
struct HttpConfig {
    url: String,
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    headers: HashMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

pub struct HttpRequestHandler {
    client: reqwest::Client,
}

impl HttpRequestHandler {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpRequestHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeHandler for HttpRequestHandler {
    async fn execute(&self, node: &Node, _ctx: &ExecutionContext) -> ExecutionResult {
        let config: HttpConfig = match parse_config("http_request", &node.config) {
            Ok(config) => config,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        let method = match config.method.to_uppercase().parse::<reqwest::Method>() {
            Ok(method) => method,
            Err(_) => {
                return ExecutionResult::failure(format!(
                    "Unsupported HTTP method: {}",
                    config.method
                ))
            }
        };

        info!("HTTP {} {} for node {}", method, config.url, node.id);

        let mut request = self.client.request(method, &config.url);
        for (key, value) in &config.headers {
            request = request.header(key, value);
        }
        if let Some(body) = node.input_value("body") {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return ExecutionResult::failure(format!("HTTP request failed: {}", e)),
        };

        let status = response.status().as_u16();
        let body: Value = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            Err(e) => return ExecutionResult::failure(format!("Failed to read response: {}", e)),
        };

        let mut outputs = HashMap::new();
        outputs.insert("response".to_string(), body);
        outputs.insert("status".to_string(), json!(status));
        ExecutionResult::success(outputs)
    }

    fn node_type(&self) -> &'static str {
        "http_request"
    }

    fn validate_config(&self, config: &Map<String, Value>) -> Result<(), GraphError> {
        let config: HttpConfig = parse_config("http_request", config)?;
        if config.url.is_empty() {
            return Err(GraphError::InvalidConfig {
                node_type: "http_request".to_string(),
                message: "url cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
