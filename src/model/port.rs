// ABOUTME: Port and port type definitions for node inputs and outputs
// ABOUTME: Provides the type lattice used for connection compatibility checks

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier for a node within a project.
pub type NodeId = String;

/// Unique identifier for a port within a node.
pub type PortId = String;

/// The data type carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    Text,
    Image,
    Video,
    Audio,
    Number,
    Boolean,
    /// Accepts or produces any type.
    Any,
}

impl PortType {
    /// Check whether a connection between this type and `other` is type-correct.
    /// `Any` is compatible with everything; otherwise the types must match.
    pub fn is_compatible_with(&self, other: &PortType) -> bool {
        if matches!(self, PortType::Any) || matches!(other, PortType::Any) {
            return true;
        }
        self == other
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PortType::Text => "text",
            PortType::Image => "image",
            PortType::Video => "video",
            PortType::Audio => "audio",
            PortType::Number => "number",
            PortType::Boolean => "boolean",
            PortType::Any => "any",
        };
        write!(f, "{}", name)
    }
}

/// A named, typed slot through which a value enters or leaves a node.
///
/// The connection bookkeeping fields (`connected`, `source_node_id`,
/// `source_output_id`) are only meaningful on input ports and are maintained
/// by `Project` edge mutators and by the scheduler during propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: PortId,
    pub name: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub source_node_id: Option<NodeId>,
    #[serde(default)]
    pub source_output_id: Option<PortId>,
}

impl Port {
    /// Create an input port.
    pub fn input(id: impl Into<String>, name: impl Into<String>, port_type: PortType, required: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            port_type,
            required,
            value: None,
            connected: false,
            source_node_id: None,
            source_output_id: None,
        }
    }

    /// Create an output port.
    pub fn output(id: impl Into<String>, name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            port_type,
            required: false,
            value: None,
            connected: false,
            source_node_id: None,
            source_output_id: None,
        }
    }

    /// Whether the port currently holds a usable value. Null and the empty
    /// string count as absent for required-input completeness.
    pub fn has_value(&self) -> bool {
        match &self.value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Clear connection state, leaving any literal value in place.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.source_node_id = None;
        self.source_output_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_compatibility() {
        assert!(PortType::Text.is_compatible_with(&PortType::Text));
        assert!(PortType::Any.is_compatible_with(&PortType::Video));
        assert!(PortType::Image.is_compatible_with(&PortType::Any));
        assert!(!PortType::Text.is_compatible_with(&PortType::Image));
        assert!(!PortType::Number.is_compatible_with(&PortType::Boolean));
    }

    #[test]
    fn test_has_value_semantics() {
        let mut port = Port::input("prompt", "Prompt", PortType::Text, true);
        assert!(!port.has_value());

        port.value = Some(Value::Null);
        assert!(!port.has_value());

        port.value = Some(json!(""));
        assert!(!port.has_value());

        port.value = Some(json!("hello"));
        assert!(port.has_value());

        port.value = Some(json!(0));
        assert!(port.has_value());
    }

    #[test]
    fn test_port_serialization_shape() {
        let port = Port::input("x", "X", PortType::Number, true);
        let value = serde_json::to_value(&port).unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["required"], true);
        assert_eq!(value["connected"], false);
    }
}
