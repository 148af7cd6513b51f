//! Log message records (report.js).
//!
//! JSON shape:
//! {
//!   "severity": "LOG_WARNING",
//!   "source": "POSTPROCESSING",
//!   "anchor": 12,
//!   "message_parts": [
//!     { "type": "string", "data": "Found a signal loop involving" },
//!     { "type": "node", "id": 12 },
//!     { "type": "group", "id": 3 },
//!     { "type": "subnet", "nodes": [12, 13] },
//!     { "type": "nodeport", "node": 12, "port": 0 }
//!   ]
//! }

use crate::spec::record::{array_field, field_text, js_string};

use serde::Deserialize;
use serde_json::Value;

/// Text that marks a message as a signal loop report.
pub const LOOP_MARKER: &str = "signal loop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Text(String),
    Node(String),
    Group(String),
    NodePort { node: String, port: String },
    Subnet(Vec<String>),
    /// A part with an unknown `type`; kept so the count stays honest.
    Other(Value),
}

/// Wire shape of a part; anything that fails to match becomes `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawPart {
    String {
        #[serde(default)]
        data: Value,
    },
    Node {
        id: Value,
    },
    Group {
        id: Value,
    },
    Subnet {
        #[serde(default)]
        nodes: Vec<Value>,
    },
    Nodeport {
        node: Value,
        #[serde(default)]
        port: Value,
    },
}

impl MessagePart {
    pub fn from_value(value: &Value) -> Self {
        match RawPart::deserialize(value) {
            Ok(RawPart::String { data }) => match data {
                Value::Null => MessagePart::Text(String::new()),
                other => MessagePart::Text(js_string(&other)),
            },
            Ok(RawPart::Node { id }) => MessagePart::Node(js_string(&id)),
            Ok(RawPart::Group { id }) => MessagePart::Group(js_string(&id)),
            Ok(RawPart::Subnet { nodes }) => {
                MessagePart::Subnet(nodes.iter().map(js_string).collect())
            }
            Ok(RawPart::Nodeport { node, port }) => MessagePart::NodePort {
                node: js_string(&node),
                port: js_string(&port),
            },
            Err(_) => MessagePart::Other(value.clone()),
        }
    }

    /// The node this part points at, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            MessagePart::Node(id) => Some(id),
            MessagePart::NodePort { node, .. } => Some(node),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogMessage {
    pub severity: String,
    pub source: String,
    pub anchor: Option<String>,
    pub parts: Vec<MessagePart>,
}

impl LogMessage {
    pub fn from_value(value: &Value) -> Self {
        LogMessage {
            severity: field_text(value, "severity").unwrap_or_default(),
            source: field_text(value, "source").unwrap_or_default(),
            anchor: field_text(value, "anchor"),
            parts: array_field(value, "message_parts")
                .iter()
                .map(MessagePart::from_value)
                .collect(),
        }
    }

    /// Whether any text part mentions a signal loop.
    pub fn reports_loop(&self) -> bool {
        self.parts.iter().any(|p| match p {
            MessagePart::Text(text) => text.contains(LOOP_MARKER),
            _ => false,
        })
    }
}

/// Display colour for a severity level.
pub fn severity_color(severity: &str) -> &'static str {
    match severity {
        "LOG_INFO" => "#0DCAF0",
        "LOG_WARNING" => "#FFC107",
        "LOG_ERROR" => "#BB2D3B",
        _ => "black",
    }
}
