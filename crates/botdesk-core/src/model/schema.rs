// ── Tool settings schema ──
//
// Server-supplied field descriptions for a tool's settings form. Parsed
// from the wire at the boundary; unknown kinds are rejected there.

use serde::Serialize;
use serde_json::Value;

/// Input kind of a schema field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Password,
    Number,
    Boolean,
    Select { options: Vec<Value> },
}

impl FieldKind {
    /// Parse a wire kind, attaching options for `select`.
    pub fn parse(kind: &str, options: Option<Vec<Value>>) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "url" => Some(Self::String),
            "password" | "secret" => Some(Self::Password),
            "number" | "integer" | "float" => Some(Self::Number),
            "boolean" | "bool" => Some(Self::Boolean),
            "select" => Some(Self::Select {
                options: options.unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Password => "password",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select { .. } => "select",
        }
    }
}

/// One field of a tool's settings schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

/// Ordered schema as delivered by the backend.
pub type FieldSchema = Vec<FieldSpec>;

/// Text shown for a select option value.
pub fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
