// ABOUTME: Node template catalog describing the declared shape of each node type
// ABOUTME: Templates are data only; behavior lives in the handler registry

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{GraphError, Result};
use super::node::Node;
use super::port::{Port, PortType};

/// Expected JSON kind of a config entry, checked at instantiation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    Text,
    Number,
    Boolean,
    Array,
    Object,
}

impl ConfigKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            ConfigKind::Text => value.is_string(),
            ConfigKind::Number => value.is_number(),
            ConfigKind::Boolean => value.is_boolean(),
            ConfigKind::Array => value.is_array(),
            ConfigKind::Object => value.is_object(),
        }
    }
}

/// Declared config entry for a node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigField {
    pub key: String,
    pub kind: ConfigKind,
    pub required: bool,
}

impl ConfigField {
    fn new(key: &str, kind: ConfigKind, required: bool) -> Self {
        Self {
            key: key.to_string(),
            kind,
            required,
        }
    }
}

/// Declared shape of a node type: default ports, default config, and the
/// config schema used to validate overrides when a node is instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTemplate {
    pub node_type: String,
    pub label: String,
    pub description: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub default_config: Map<String, Value>,
    pub config_schema: Vec<ConfigField>,
}

impl NodeTemplate {
    /// Validate a config map against this template's schema.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Result<()> {
        for field in &self.config_schema {
            match config.get(&field.key) {
                Some(value) => {
                    if !field.kind.matches(value) {
                        return Err(GraphError::InvalidConfig {
                            node_type: self.node_type.clone(),
                            message: format!(
                                "config key '{}' expects {:?}",
                                field.key, field.kind
                            ),
                        });
                    }
                }
                None if field.required => {
                    return Err(GraphError::InvalidConfig {
                        node_type: self.node_type.clone(),
                        message: format!("missing required config key '{}'", field.key),
                    });
                }
                None => {}
            }
        }
        for key in config.keys() {
            if !self.config_schema.iter().any(|f| &f.key == key) {
                return Err(GraphError::InvalidConfig {
                    node_type: self.node_type.clone(),
                    message: format!("unknown config key '{}'", key),
                });
            }
        }
        Ok(())
    }
}

/// Immutable catalog of node templates, loaded once at startup.
pub struct TemplateCatalog {
    templates: IndexMap<String, NodeTemplate>,
}

impl TemplateCatalog {
    /// Catalog of all built-in node types.
    pub fn builtin() -> Self {
        let mut templates = IndexMap::new();
        for template in builtin_templates() {
            templates.insert(template.node_type.clone(), template);
        }
        Self { templates }
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeTemplate> {
        self.templates.get(node_type)
    }

    pub fn node_types(&self) -> Vec<&str> {
        self.templates.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeTemplate> {
        self.templates.values()
    }

    /// Instantiate a node from a template, merging config overrides over the
    /// template defaults. Overrides are validated against the schema here,
    /// not at execution time.
    pub fn instantiate(
        &self,
        node_type: &str,
        node_id: impl Into<String>,
        overrides: Map<String, Value>,
    ) -> Result<Node> {
        let template = self
            .get(node_type)
            .ok_or_else(|| GraphError::UnknownTemplate {
                node_type: node_type.to_string(),
            })?;

        let mut config = template.default_config.clone();
        for (key, value) in overrides {
            config.insert(key, value);
        }
        template.validate_config(&config)?;

        let mut node = Node::new(node_id, node_type);
        node.inputs = template.inputs.clone();
        node.outputs = template.outputs.clone();
        node.config = config;
        Ok(node)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn media_input_template(node_type: &str, label: &str, port_type: PortType) -> NodeTemplate {
    NodeTemplate {
        node_type: node_type.to_string(),
        label: label.to_string(),
        description: format!("{} ingestion node; emits its configured payload", label),
        inputs: vec![],
        outputs: vec![Port::output("output", "Output", port_type)],
        default_config: Map::new(),
        config_schema: vec![
            ConfigField::new("value", ConfigKind::Text, false),
            ConfigField::new("source", ConfigKind::Text, false),
        ],
    }
}

fn generation_template(node_type: &str, label: &str, output_type: PortType) -> NodeTemplate {
    let mut default_config = Map::new();
    default_config.insert("model".to_string(), json!("default"));
    NodeTemplate {
        node_type: node_type.to_string(),
        label: label.to_string(),
        description: format!("{} via an external model call", label),
        inputs: vec![Port::input("prompt", "Prompt", PortType::Text, true)],
        outputs: vec![Port::output("output", "Output", output_type)],
        default_config,
        config_schema: vec![
            ConfigField::new("model", ConfigKind::Text, false),
            ConfigField::new("latency_ms", ConfigKind::Number, false),
            ConfigField::new("duration", ConfigKind::Number, false),
        ],
    }
}

fn builtin_templates() -> Vec<NodeTemplate> {
    vec![
        media_input_template("text_input", "Text Input", PortType::Text),
        media_input_template("image_input", "Image Input", PortType::Image),
        media_input_template("video_input", "Video Input", PortType::Video),
        media_input_template("audio_input", "Audio Input", PortType::Audio),
        generation_template("text_generation", "Text Generation", PortType::Text),
        generation_template("image_generation", "Image Generation", PortType::Image),
        generation_template("video_generation", "Video Generation", PortType::Video),
        generation_template("audio_generation", "Audio Generation", PortType::Audio),
        NodeTemplate {
            node_type: "speech_to_text".to_string(),
            label: "Speech to Text".to_string(),
            description: "Transcribes an audio payload to text".to_string(),
            inputs: vec![Port::input("audio", "Audio", PortType::Audio, true)],
            outputs: vec![Port::output("text", "Text", PortType::Text)],
            default_config: {
                let mut m = Map::new();
                m.insert("model".to_string(), json!("default"));
                m
            },
            config_schema: vec![
                ConfigField::new("model", ConfigKind::Text, false),
                ConfigField::new("language", ConfigKind::Text, false),
                ConfigField::new("latency_ms", ConfigKind::Number, false),
            ],
        },
        NodeTemplate {
            node_type: "text_to_speech".to_string(),
            label: "Text to Speech".to_string(),
            description: "Synthesizes speech audio from text".to_string(),
            inputs: vec![Port::input("text", "Text", PortType::Text, true)],
            outputs: vec![Port::output("audio", "Audio", PortType::Audio)],
            default_config: {
                let mut m = Map::new();
                m.insert("model".to_string(), json!("default"));
                m
            },
            config_schema: vec![
                ConfigField::new("model", ConfigKind::Text, false),
                ConfigField::new("voice", ConfigKind::Text, false),
                ConfigField::new("latency_ms", ConfigKind::Number, false),
            ],
        },
        NodeTemplate {
            node_type: "http_request".to_string(),
            label: "HTTP Request".to_string(),
            description: "Performs one HTTP request; no internal retry".to_string(),
            inputs: vec![Port::input("body", "Body", PortType::Any, false)],
            outputs: vec![
                Port::output("response", "Response", PortType::Any),
                Port::output("status", "Status", PortType::Number),
            ],
            default_config: {
                let mut m = Map::new();
                m.insert("method".to_string(), json!("GET"));
                m
            },
            config_schema: vec![
                ConfigField::new("url", ConfigKind::Text, true),
                ConfigField::new("method", ConfigKind::Text, false),
                ConfigField::new("headers", ConfigKind::Object, false),
            ],
        },
        NodeTemplate {
            node_type: "condition".to_string(),
            label: "Condition".to_string(),
            description: "Routes its input to the true or false output".to_string(),
            inputs: vec![Port::input("input", "Input", PortType::Any, true)],
            outputs: vec![
                Port::output("true", "True", PortType::Any),
                Port::output("false", "False", PortType::Any),
            ],
            default_config: {
                let mut m = Map::new();
                m.insert("operator".to_string(), json!("equals"));
                m
            },
            config_schema: vec![
                ConfigField::new("operator", ConfigKind::Text, true),
                ConfigField::new("value", ConfigKind::Text, false),
            ],
        },
        NodeTemplate {
            node_type: "loop".to_string(),
            label: "Loop".to_string(),
            description: "Bounded iteration over an array input".to_string(),
            inputs: vec![Port::input("items", "Items", PortType::Any, true)],
            outputs: vec![Port::output("results", "Results", PortType::Any)],
            default_config: {
                let mut m = Map::new();
                m.insert("max_iterations".to_string(), json!(100));
                m
            },
            config_schema: vec![ConfigField::new(
                "max_iterations",
                ConfigKind::Number,
                false,
            )],
        },
        NodeTemplate {
            node_type: "merge".to_string(),
            label: "Merge".to_string(),
            description: "Combines up to three inputs by a configured strategy".to_string(),
            inputs: vec![
                Port::input("input_1", "Input 1", PortType::Any, true),
                Port::input("input_2", "Input 2", PortType::Any, false),
                Port::input("input_3", "Input 3", PortType::Any, false),
            ],
            outputs: vec![Port::output("output", "Output", PortType::Any)],
            default_config: {
                let mut m = Map::new();
                m.insert("strategy".to_string(), json!("object"));
                m
            },
            config_schema: vec![
                ConfigField::new("strategy", ConfigKind::Text, false),
                ConfigField::new("separator", ConfigKind::Text, false),
            ],
        },
        NodeTemplate {
            node_type: "save_file".to_string(),
            label: "Save File".to_string(),
            description: "Writes its input payload to disk".to_string(),
            inputs: vec![Port::input("data", "Data", PortType::Any, true)],
            outputs: vec![Port::output("file", "File", PortType::Text)],
            default_config: Map::new(),
            config_schema: vec![ConfigField::new("path", ConfigKind::Text, false)],
        },
        NodeTemplate {
            node_type: "webhook".to_string(),
            label: "Webhook".to_string(),
            description: "POSTs its input payload to a configured URL".to_string(),
            inputs: vec![Port::input("payload", "Payload", PortType::Any, true)],
            outputs: vec![Port::output("status", "Status", PortType::Number)],
            default_config: Map::new(),
            config_schema: vec![ConfigField::new("url", ConfigKind::Text, true)],
        },
        NodeTemplate {
            node_type: "export".to_string(),
            label: "Export".to_string(),
            description: "Serializes its input payload to a JSON document".to_string(),
            inputs: vec![Port::input("data", "Data", PortType::Any, true)],
            outputs: vec![Port::output("document", "Document", PortType::Text)],
            default_config: Map::new(),
            config_schema: vec![ConfigField::new("pretty", ConfigKind::Boolean, false)],
        },
    ]
}
