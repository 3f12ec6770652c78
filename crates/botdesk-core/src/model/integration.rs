// ── Integration snapshots ──
//
// Server-reported state of the messaging connector and the language-model
// provider. Masks only; secrets never appear here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default messaging API base URL, substituted when the field is blank.
pub const DEFAULT_CONNECTOR_ENDPOINT: &str = "https://api.telegram.org";

/// Which integration an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntegrationKind {
    Connector,
    Provider,
}

/// Connectivity status as last reported by the backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    NotConfigured,
    Checking,
    Success,
    Failed,
}

impl ConnectionStatus {
    /// Parse a wire status. Missing means not configured; anything
    /// unrecognized is treated as a failure.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | "not_configured") => Self::NotConfigured,
            Some("success") => Self::Success,
            Some("checking") => Self::Checking,
            Some(_) => Self::Failed,
        }
    }

    /// Human-readable status line.
    pub fn display_text(self) -> &'static str {
        match self {
            Self::NotConfigured => "Not configured",
            Self::Checking => "Checking connection...",
            Self::Success => "Connection tested successfully",
            Self::Failed => "Connection failed",
        }
    }
}

/// Snapshot of the messaging connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectorSettings {
    /// Placeholder mask of the stored token (e.g. `...Yeh6Q`).
    pub credential_masked: Option<String>,
    /// Display mask of the token the running bot uses.
    pub active_masked: Option<String>,
    pub is_active: bool,
    pub endpoint_url: String,
    pub connection_status: ConnectionStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_activated_at: Option<DateTime<Utc>>,
}

/// Snapshot of the language-model provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderSettings {
    pub provider_type: Option<String>,
    pub credential_masked: Option<String>,
    pub active_masked: Option<String>,
    pub is_active: bool,
    pub endpoint_url: String,
    pub model: String,
    pub system_prompt: Option<String>,
    /// Enterprise gateway endpoint (Azure-style deployments).
    pub gateway_endpoint: Option<String>,
    pub api_version: Option<String>,
    pub project_id: Option<String>,
    pub connection_status: ConnectionStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_activated_at: Option<DateTime<Utc>>,
}

impl ProviderSettings {
    /// Whether the snapshot's stored key belongs to `provider_id`.
    pub fn has_key_for(&self, provider_id: &str) -> bool {
        self.provider_type.as_deref() == Some(provider_id)
            && (self.credential_masked.is_some() || self.is_active)
    }
}

/// Result of a connectivity test call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    pub status: ConnectionStatus,
    pub message: Option<String>,
}

/// Result of an activation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub activated: bool,
    pub message: Option<String>,
}
