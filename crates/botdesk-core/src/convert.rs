// ── API-to-domain type conversions ──
//
// Bridges raw `botdesk_api::types` payloads into `botdesk_core::model`.
// Empty strings normalize to `None`, timestamps are parsed leniently, and
// schema entries with an unknown kind are rejected here.

use chrono::{DateTime, NaiveDateTime, Utc};

use botdesk_api::types::{
    ActivationResponse, ConnectivityResponse, ConnectorSettingsResponse, LiveModelResponse,
    ProviderCatalogResponse, ProviderSettingsResponse, SettingSchemaResponse, ToolActionResponse,
    ToolResponse, ToolSettingsResponse, ToolsResponse,
};

use crate::error::CoreError;
use crate::model::{
    ActivationReport, ConnectionStatus, ConnectivityReport, ConnectorSettings, FieldKind,
    FieldSpec, ModelInfo, ModelTiers, ProviderCatalogEntry, ProviderSettings, ToolListing,
    ToolReport, ToolSchema, ToolSummary, DEFAULT_CONNECTOR_ENDPOINT,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Trimmed, non-empty string or `None`.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Parse an ISO-8601 timestamp. Naive timestamps are taken as UTC.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

// ── Settings ───────────────────────────────────────────────────────

impl From<ConnectorSettingsResponse> for ConnectorSettings {
    fn from(raw: ConnectorSettingsResponse) -> Self {
        Self {
            credential_masked: non_empty(raw.access_token_masked),
            active_masked: non_empty(raw.active_token_masked),
            is_active: raw.is_active,
            endpoint_url: non_empty(raw.base_url)
                .unwrap_or_else(|| DEFAULT_CONNECTOR_ENDPOINT.to_owned()),
            connection_status: ConnectionStatus::from_wire(raw.connection_status.as_deref()),
            last_checked: parse_datetime(raw.last_checked.as_deref()),
            last_activated_at: parse_datetime(raw.last_activated_at.as_deref()),
        }
    }
}

impl From<ProviderSettingsResponse> for ProviderSettings {
    fn from(raw: ProviderSettingsResponse) -> Self {
        Self {
            provider_type: non_empty(raw.llm_type),
            credential_masked: non_empty(raw.api_key_masked),
            active_masked: non_empty(raw.active_token_masked),
            is_active: raw.is_active,
            endpoint_url: non_empty(raw.base_url).unwrap_or_default(),
            model: non_empty(raw.model_type).unwrap_or_default(),
            system_prompt: non_empty(raw.system_prompt),
            gateway_endpoint: non_empty(raw.azure_endpoint),
            api_version: non_empty(raw.api_version),
            project_id: non_empty(raw.project_id),
            connection_status: ConnectionStatus::from_wire(raw.connection_status.as_deref()),
            last_checked: parse_datetime(raw.last_checked.as_deref()),
            last_activated_at: parse_datetime(raw.last_activated_at.as_deref()),
        }
    }
}

impl From<ConnectivityResponse> for ConnectivityReport {
    fn from(raw: ConnectivityResponse) -> Self {
        Self {
            status: ConnectionStatus::from_wire(Some(&raw.status)),
            message: non_empty(raw.message),
        }
    }
}

impl From<ActivationResponse> for ActivationReport {
    fn from(raw: ActivationResponse) -> Self {
        Self {
            activated: raw.activated,
            message: non_empty(raw.message),
        }
    }
}

// ── Provider catalog ───────────────────────────────────────────────

impl From<ProviderCatalogResponse> for ProviderCatalogEntry {
    fn from(raw: ProviderCatalogResponse) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            default_base_url: non_empty(raw.default_base_url).unwrap_or_default(),
            models: ModelTiers {
                standard: raw.models.standard,
                reasoning: raw.models.reasoning,
            },
        }
    }
}

impl From<LiveModelResponse> for ModelInfo {
    fn from(raw: LiveModelResponse) -> Self {
        Self {
            id: raw.id.trim().to_owned(),
            display_name: non_empty(raw.display_name),
        }
    }
}

// ── Tools ──────────────────────────────────────────────────────────

impl From<ToolResponse> for ToolSummary {
    fn from(raw: ToolResponse) -> Self {
        let plugin_name = if raw.plugin_name.trim().is_empty() {
            raw.plugin_id.clone()
        } else {
            raw.plugin_name
        };
        Self {
            name: raw.name,
            description: raw.description,
            plugin_id: raw.plugin_id,
            plugin_name,
            enabled: raw.enabled,
            needs_config: raw.needs_config,
            has_settings: raw.has_settings,
        }
    }
}

impl From<ToolsResponse> for ToolListing {
    fn from(raw: ToolsResponse) -> Self {
        Self {
            tools: raw.tools.into_iter().map(ToolSummary::from).collect(),
            total: raw.total,
            enabled_count: raw.enabled_count,
        }
    }
}

impl From<ToolActionResponse> for ToolReport {
    fn from(raw: ToolActionResponse) -> Self {
        Self {
            success: raw.success,
            message: non_empty(raw.message),
        }
    }
}

impl TryFrom<SettingSchemaResponse> for FieldSpec {
    type Error = CoreError;

    fn try_from(raw: SettingSchemaResponse) -> Result<Self, Self::Error> {
        let kind = FieldKind::parse(&raw.kind, raw.options).ok_or_else(|| CoreError::Payload {
            message: format!("setting '{}' has unknown type '{}'", raw.key, raw.kind),
        })?;
        let label = non_empty(raw.label).unwrap_or_else(|| raw.key.clone());
        Ok(Self {
            key: raw.key,
            label,
            kind,
            required: raw.required,
            default: raw.default.filter(|v| !v.is_null()),
            description: non_empty(raw.description),
        })
    }
}

impl TryFrom<ToolSettingsResponse> for ToolSchema {
    type Error = CoreError;

    fn try_from(raw: ToolSettingsResponse) -> Result<Self, Self::Error> {
        let schema = raw
            .schema
            .into_iter()
            .map(FieldSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            plugin_id: raw.plugin_id,
            schema,
            current: raw.settings,
        })
    }
}
