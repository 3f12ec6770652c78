//! Wire types for the admin settings backend.
//!
//! Settings payloads use camelCase (`#[serde(rename_all = "camelCase")]`);
//! the tool endpoints and the live model listing use snake_case as sent.
//! Request bodies borrow their strings so secrets are only exposed for
//! the duration of serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Settings snapshots ───────────────────────────────────────────────

/// Messaging connector block: `telegram` in `GET /api/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSettingsResponse {
    #[serde(default)]
    pub access_token_masked: Option<String>,
    #[serde(default)]
    pub active_token_masked: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub last_activated_at: Option<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// Language-model provider block: `llm` in `GET /api/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettingsResponse {
    #[serde(default)]
    pub llm_type: Option<String>,
    #[serde(default)]
    pub api_key_masked: Option<String>,
    #[serde(default)]
    pub active_token_masked: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub azure_endpoint: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub last_activated_at: Option<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// `GET /api/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub telegram: ConnectorSettingsResponse,
    #[serde(default)]
    pub llm: ProviderSettingsResponse,
}

// ── Connector requests ───────────────────────────────────────────────

/// `PUT /api/settings/telegram`. A `null` token keeps the stored one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorReplaceRequest<'a> {
    pub access_token: Option<&'a str>,
    pub base_url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorReplaceResponse {
    pub telegram: ConnectorSettingsResponse,
    #[serde(default)]
    pub applied: bool,
}

/// Body of both connector DELETE endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorEnvelope {
    pub telegram: ConnectorSettingsResponse,
}

// ── Provider requests ────────────────────────────────────────────────

/// `PUT /api/settings/llm`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderReplaceRequest<'a> {
    pub llm_type: &'a str,
    pub api_key: Option<&'a str>,
    pub base_url: &'a str,
    pub model_type: &'a str,
    pub system_prompt: Option<&'a str>,
    pub project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_endpoint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<&'a str>,
}

/// `PATCH /api/settings/llm`.
///
/// `project_id` is only sent when it changed; `Some(None)` clears it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPatchRequest<'a> {
    pub model_type: &'a str,
    pub system_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_endpoint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<&'a str>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderReplaceResponse {
    pub llm: ProviderSettingsResponse,
    #[serde(default)]
    pub applied: bool,
}

/// Body of the PATCH and both provider DELETE endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEnvelope {
    pub llm: ProviderSettingsResponse,
}

// ── Connectivity ─────────────────────────────────────────────────────

/// `POST /api/settings/{telegram,llm}/test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectivityResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/settings/{telegram,llm}/activate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivationResponse {
    pub activated: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Provider catalog ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelTiersResponse {
    #[serde(default)]
    pub standard: Vec<String>,
    #[serde(default)]
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCatalogResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub default_base_url: Option<String>,
    #[serde(default)]
    pub models: ModelTiersResponse,
}

/// `GET /api/settings/llm/providers`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersResponse {
    #[serde(default)]
    pub providers: Vec<ProviderCatalogResponse>,
}

/// `POST /api/settings/llm/fetch-models`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchModelsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiveModelResponse {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchModelsResponse {
    #[serde(default)]
    pub models: Vec<LiveModelResponse>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Tools ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolResponse {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub plugin_id: String,
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub needs_config: bool,
    #[serde(default)]
    pub has_settings: bool,
}

/// `GET /api/tools`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsResponse {
    #[serde(default)]
    pub tools: Vec<ToolResponse>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub enabled_count: usize,
}

/// One schema entry from `GET /api/tools/{name}/settings`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingSchemaResponse {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /api/tools/{name}/settings`. Secret values arrive masked (`***…`).
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettingsResponse {
    pub plugin_id: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub schema: Vec<SettingSchemaResponse>,
}

/// `PUT /api/tools/{name}/settings`.
#[derive(Debug, Serialize)]
pub struct ToolSettingsRequest<'a> {
    pub settings: &'a Map<String, Value>,
}

/// Result shape shared by tool test/enable/disable/save.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
