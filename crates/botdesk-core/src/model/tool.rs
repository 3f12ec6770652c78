// ── Tools ──

use serde::Serialize;
use serde_json::{Map, Value};

use super::schema::FieldSchema;

/// Settings map submitted to and received from a tool.
pub type ToolSettings = Map<String, Value>;

/// Catalog entry for an extension tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub plugin_id: String,
    pub plugin_name: String,
    pub enabled: bool,
    pub needs_config: bool,
    pub has_settings: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolListing {
    pub tools: Vec<ToolSummary>,
    pub total: usize,
    pub enabled_count: usize,
}

/// Schema plus masked current values, as fetched when a settings surface opens.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub plugin_id: String,
    pub schema: FieldSchema,
    pub current: ToolSettings,
}

/// Outcome of a tool action that reports `{success, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReport {
    pub success: bool,
    pub message: Option<String>,
}
