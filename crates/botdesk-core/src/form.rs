// ── Edit forms ──
//
// Mutable per-surface input state, seeded from the last snapshot. Change
// detection and validity are computed from these against the snapshot.

use crate::config::{ProviderPolicy, SessionConfig};
use crate::credential::{BoundCredential, CredentialField};
use crate::model::{ConnectorSettings, ModelMenu, ProviderSettings};

/// Messaging connector inputs.
#[derive(Debug, Clone)]
pub struct ConnectorForm {
    pub credential: CredentialField,
    pub endpoint_url: String,
}

impl ConnectorForm {
    pub fn from_snapshot(snapshot: Option<&ConnectorSettings>, config: &SessionConfig) -> Self {
        Self {
            credential: CredentialField::with_mask(
                config.connector_placeholder.clone(),
                snapshot.and_then(|s| s.credential_masked.as_deref()),
            ),
            endpoint_url: snapshot
                .map(|s| s.endpoint_url.clone())
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| config.connector_default_endpoint.clone()),
        }
    }
}

/// Language-model provider inputs.
#[derive(Debug, Clone)]
pub struct ProviderForm {
    pub provider_type: String,
    pub credential: CredentialField,
    pub endpoint_url: String,
    /// Picked option for list-based providers.
    pub selected_model: String,
    /// Typed model for free-text providers.
    pub free_text_model: String,
    pub system_prompt: String,
    pub project_id: String,
    pub gateway_endpoint: String,
    pub api_version: String,
}

impl ProviderForm {
    pub fn from_snapshot(snapshot: Option<&ProviderSettings>, config: &SessionConfig) -> Self {
        let policy = &config.provider_policy;
        let provider_type = snapshot
            .and_then(|s| s.provider_type.clone())
            .unwrap_or_default();
        let model = snapshot.map(|s| s.model.clone()).unwrap_or_default();
        let free_text = policy.uses_free_text_model(&provider_type);

        Self {
            credential: CredentialField::with_mask(
                config.provider_placeholder.clone(),
                snapshot.and_then(|s| s.credential_masked.as_deref()),
            ),
            endpoint_url: snapshot.map(|s| s.endpoint_url.clone()).unwrap_or_default(),
            selected_model: if free_text { String::new() } else { model.clone() },
            free_text_model: if free_text { model } else { String::new() },
            system_prompt: snapshot
                .and_then(|s| s.system_prompt.clone())
                .unwrap_or_default(),
            project_id: snapshot
                .and_then(|s| s.project_id.clone())
                .unwrap_or_default(),
            gateway_endpoint: snapshot
                .and_then(|s| s.gateway_endpoint.clone())
                .unwrap_or_default(),
            api_version: snapshot
                .and_then(|s| s.api_version.clone())
                .unwrap_or_default(),
            provider_type,
        }
    }

    /// Set the model in whichever input the provider uses.
    pub fn set_model(&mut self, model: impl Into<String>, policy: &ProviderPolicy) {
        if policy.uses_free_text_model(&self.provider_type) {
            self.free_text_model = model.into();
        } else {
            self.selected_model = model.into();
        }
    }

    /// Pick a model from a menu; ids not in the menu fall back to its preselection.
    pub fn choose_from(&mut self, menu: &ModelMenu, id: Option<&str>) {
        self.selected_model = match id {
            Some(id) if menu.contains(id) => id.to_owned(),
            _ => menu.selected.clone().unwrap_or_default(),
        };
    }
}

/// Active-binding evidence carried by a connector snapshot.
pub fn connector_binding(snapshot: Option<&ConnectorSettings>) -> BoundCredential {
    snapshot.map_or_else(BoundCredential::default, |s| {
        BoundCredential::new(s.is_active, s.active_masked.as_deref())
    })
}

/// Active-binding evidence carried by a provider snapshot.
pub fn provider_binding(snapshot: Option<&ProviderSettings>) -> BoundCredential {
    snapshot.map_or_else(BoundCredential::default, |s| {
        BoundCredential::new(s.is_active, s.active_masked.as_deref())
    })
}
