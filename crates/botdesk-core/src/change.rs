// ── Change detection ──
//
// Diffs a form against its snapshot and decides how a save is routed:
// nothing, a partial update, or a full reconfiguration.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::config::ProviderPolicy;
use crate::form::{ConnectorForm, ProviderForm};
use crate::model::{ConnectorSettings, ProviderSettings};
use crate::validity::effective_model;

/// A field whose edit the backend must learn about. Displays as the wire name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, IntoStaticStr,
)]
pub enum TrackedField {
    #[strum(serialize = "llmType")]
    ProviderType,
    #[strum(serialize = "apiKey")]
    Credential,
    #[strum(serialize = "baseUrl")]
    EndpointUrl,
    #[strum(serialize = "modelType")]
    Model,
    #[strum(serialize = "systemPrompt")]
    SystemPrompt,
    #[strum(serialize = "projectId")]
    ProjectId,
    #[strum(serialize = "azureEndpoint")]
    GatewayEndpoint,
    #[strum(serialize = "apiVersion")]
    ApiVersion,
}

impl TrackedField {
    /// Fields that change which backend or credential is used.
    pub fn affects_identity(self) -> bool {
        matches!(
            self,
            Self::ProviderType
                | Self::Credential
                | Self::EndpointUrl
                | Self::GatewayEndpoint
                | Self::ApiVersion
        )
    }
}

/// How a save reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRoute {
    NoOp,
    FullReplace,
    PartialUpdate,
}

/// Fields that differ from the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    changed: BTreeSet<TrackedField>,
    requires_full_reconfiguration: bool,
}

impl ChangeSet {
    pub fn from_fields(fields: impl IntoIterator<Item = TrackedField>) -> Self {
        let changed: BTreeSet<_> = fields.into_iter().collect();
        let requires_full_reconfiguration = changed.iter().any(|f| f.affects_identity());
        Self {
            changed,
            requires_full_reconfiguration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn contains(&self, field: TrackedField) -> bool {
        self.changed.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = TrackedField> + '_ {
        self.changed.iter().copied()
    }

    pub fn requires_full_reconfiguration(&self) -> bool {
        self.requires_full_reconfiguration
    }

    pub fn route(&self) -> SaveRoute {
        if self.is_empty() {
            SaveRoute::NoOp
        } else if self.requires_full_reconfiguration {
            SaveRoute::FullReplace
        } else {
            SaveRoute::PartialUpdate
        }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self.changed.iter().map(|&field| field.into()).collect();
        f.write_str(&names.join(", "))
    }
}

fn norm(value: Option<&str>) -> &str {
    value.map_or("", str::trim)
}

/// Blank endpoint means "use the default".
pub fn resolve_endpoint<'a>(typed: &'a str, default: &'a str) -> &'a str {
    let typed = typed.trim();
    if typed.is_empty() { default.trim() } else { typed }
}

/// Connector diff. The connector has no partial route, so any change
/// here ends in a full replace.
pub fn detect_connector_changes(
    form: &ConnectorForm,
    snapshot: Option<&ConnectorSettings>,
    default_endpoint: &str,
) -> ChangeSet {
    let mut changed = Vec::new();

    if form.credential.has_typed() {
        changed.push(TrackedField::Credential);
    }

    let endpoint = resolve_endpoint(&form.endpoint_url, default_endpoint);
    if endpoint != norm(snapshot.map(|s| s.endpoint_url.as_str())) {
        changed.push(TrackedField::EndpointUrl);
    }

    ChangeSet::from_fields(changed)
}

/// Provider diff.
///
/// `catalog_default` is the selected provider's default base URL, used
/// when the endpoint input is blank. Gateway fields and the project id
/// only count while the selected provider uses them.
pub fn detect_provider_changes(
    form: &ProviderForm,
    snapshot: Option<&ProviderSettings>,
    policy: &ProviderPolicy,
    catalog_default: &str,
) -> ChangeSet {
    let mut changed = Vec::new();
    let provider = form.provider_type.trim();

    if provider != norm(snapshot.and_then(|s| s.provider_type.as_deref())) {
        changed.push(TrackedField::ProviderType);
    }
    if form.credential.has_typed() {
        changed.push(TrackedField::Credential);
    }
    if resolve_endpoint(&form.endpoint_url, catalog_default)
        != norm(snapshot.map(|s| s.endpoint_url.as_str()))
    {
        changed.push(TrackedField::EndpointUrl);
    }
    if effective_model(form, policy).trim() != norm(snapshot.map(|s| s.model.as_str())) {
        changed.push(TrackedField::Model);
    }
    if form.system_prompt.trim() != norm(snapshot.and_then(|s| s.system_prompt.as_deref())) {
        changed.push(TrackedField::SystemPrompt);
    }
    if policy.uses_project_id(provider)
        && form.project_id.trim() != norm(snapshot.and_then(|s| s.project_id.as_deref()))
    {
        changed.push(TrackedField::ProjectId);
    }
    if policy.uses_gateway(provider) {
        if form.gateway_endpoint.trim()
            != norm(snapshot.and_then(|s| s.gateway_endpoint.as_deref()))
        {
            changed.push(TrackedField::GatewayEndpoint);
        }
        if form.api_version.trim() != norm(snapshot.and_then(|s| s.api_version.as_deref())) {
            changed.push(TrackedField::ApiVersion);
        }
    }

    ChangeSet::from_fields(changed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SessionConfig;

    fn provider_snapshot() -> ProviderSettings {
        ProviderSettings {
            provider_type: Some("openai".into()),
            credential_masked: Some("...abcde".into()),
            active_masked: Some("sk-*****abcde".into()),
            is_active: true,
            endpoint_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
            ..ProviderSettings::default()
        }
    }

    fn provider_form(snapshot: &ProviderSettings) -> ProviderForm {
        ProviderForm::from_snapshot(Some(snapshot), &SessionConfig::default())
    }

    #[test]
    fn untouched_form_has_no_changes() {
        let snap = provider_snapshot();
        let form = provider_form(&snap);
        let changes = detect_provider_changes(
            &form,
            Some(&snap),
            &ProviderPolicy::default(),
            "https://api.openai.com/v1",
        );
        assert!(changes.is_empty());
        assert_eq!(changes.route(), SaveRoute::NoOp);
    }

    #[test]
    fn model_only_edit_routes_to_partial_update() {
        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.selected_model = "gpt-4o-mini".into();
        form.system_prompt = "Be brief".into();

        let changes =
            detect_provider_changes(&form, Some(&snap), &ProviderPolicy::default(), "");

        assert_eq!(
            changes.fields().collect::<Vec<_>>(),
            vec![TrackedField::Model, TrackedField::SystemPrompt]
        );
        assert_eq!(changes.route(), SaveRoute::PartialUpdate);
    }

    #[test]
    fn provider_switch_with_blank_key_is_full_reconfiguration() {
        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.provider_type = "anthropic".into();
        form.endpoint_url = "https://api.anthropic.com".into();

        let changes =
            detect_provider_changes(&form, Some(&snap), &ProviderPolicy::default(), "");

        assert!(changes.contains(TrackedField::ProviderType));
        assert!(!changes.contains(TrackedField::Credential));
        assert_eq!(changes.route(), SaveRoute::FullReplace);
    }

    #[test]
    fn blank_endpoint_resolves_to_catalog_default() {
        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.endpoint_url = "   ".into();

        let changes = detect_provider_changes(
            &form,
            Some(&snap),
            &ProviderPolicy::default(),
            "https://api.openai.com/v1",
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn empty_string_equals_null() {
        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.project_id = "  ".into();
        let changes =
            detect_provider_changes(&form, Some(&snap), &ProviderPolicy::default(), "");
        assert!(!changes.contains(TrackedField::ProjectId));
    }

    #[test]
    fn project_id_only_tracked_for_project_scoped_providers() {
        let anthropic = ProviderSettings {
            provider_type: Some("anthropic".into()),
            endpoint_url: "https://api.anthropic.com".into(),
            ..provider_snapshot()
        };
        let mut form = provider_form(&anthropic);
        form.project_id = "proj_1".into();
        let changes =
            detect_provider_changes(&form, Some(&anthropic), &ProviderPolicy::default(), "");
        assert!(changes.is_empty());

        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.project_id = "proj_1".into();
        let changes =
            detect_provider_changes(&form, Some(&snap), &ProviderPolicy::default(), "");
        assert_eq!(changes.route(), SaveRoute::PartialUpdate);
        assert!(changes.contains(TrackedField::ProjectId));
    }

    #[test]
    fn gateway_fields_only_tracked_for_gateway_providers() {
        let snap = provider_snapshot();
        let mut form = provider_form(&snap);
        form.gateway_endpoint = "https://corp.openai.azure.com".into();
        let changes =
            detect_provider_changes(&form, Some(&snap), &ProviderPolicy::default(), "");
        assert!(changes.is_empty());

        let azure = ProviderSettings {
            provider_type: Some("azure".into()),
            api_version: Some("2024-02-15-preview".into()),
            ..provider_snapshot()
        };
        let mut form = provider_form(&azure);
        form.gateway_endpoint = "https://corp.openai.azure.com".into();
        let changes =
            detect_provider_changes(&form, Some(&azure), &ProviderPolicy::default(), "");
        assert!(changes.contains(TrackedField::GatewayEndpoint));
        assert!(changes.requires_full_reconfiguration());
    }

    #[test]
    fn connector_typed_token_is_a_change() {
        let snap = ConnectorSettings {
            credential_masked: Some("...Yeh6Q".into()),
            endpoint_url: "https://api.telegram.org".into(),
            ..ConnectorSettings::default()
        };
        let mut form = ConnectorForm::from_snapshot(Some(&snap), &SessionConfig::default());
        assert!(detect_connector_changes(&form, Some(&snap), "https://api.telegram.org").is_empty());

        form.credential.set_typed("123:abc");
        let changes = detect_connector_changes(&form, Some(&snap), "https://api.telegram.org");
        assert_eq!(changes.route(), SaveRoute::FullReplace);
        assert_eq!(changes.to_string(), "apiKey");
    }
}
