#![allow(clippy::unwrap_used)]

// Session behavior against an in-memory backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;

use botdesk_core::{
    AdminSession, Applied, ConfirmPresenter, ConfirmPrompt, ConfirmResponder, ConnectionStatus,
    ConnectivityReport, ConnectorReplace, ConnectorSettings, CoreError, FieldKind, FieldSpec,
    IntegrationKind, ModelChoices, ModelFetch, ModelInfo, NoticeLevel, ProviderCatalogEntry, ProviderPatch,
    ProviderReplace, ProviderSettings, SaveOutcome, SessionConfig, SettingsBackend, ToolListing,
    ToolReport, ToolSchema, ToolSettings, TrackedField, UnbindOutcome,
};
use botdesk_core::model::{ActivationReport, ModelTiers};

// ── Fake backend ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ReplaceCall {
    provider_type: String,
    api_key: Option<String>,
    endpoint_url: String,
    model: String,
    project_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PatchCall {
    model: String,
    system_prompt: Option<String>,
    project_id: Option<Option<String>>,
}

#[derive(Default)]
struct FakeBackend {
    connector: Mutex<ConnectorSettings>,
    provider: Mutex<ProviderSettings>,
    catalog: Vec<ProviderCatalogEntry>,
    calls: Mutex<Vec<&'static str>>,
    connector_tokens: Mutex<Vec<Option<String>>>,
    provider_replaces: Mutex<Vec<ReplaceCall>>,
    provider_patches: Mutex<Vec<PatchCall>>,
    tool_puts: Mutex<Vec<ToolSettings>>,
    applied: bool,
    /// Holds replace/fetch calls until notified.
    gate: Option<Arc<Notify>>,
    live_models: Vec<ModelInfo>,
}

impl FakeBackend {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl SettingsBackend for FakeBackend {
    async fn get_settings(&self) -> Result<(ConnectorSettings, ProviderSettings), CoreError> {
        self.record("get_settings");
        Ok((
            self.connector.lock().unwrap().clone(),
            self.provider.lock().unwrap().clone(),
        ))
    }

    async fn replace_connector(
        &self,
        request: ConnectorReplace<'_>,
    ) -> Result<Applied<ConnectorSettings>, CoreError> {
        self.record("replace_connector");
        self.connector_tokens
            .lock()
            .unwrap()
            .push(request.access_token.map(ToOwned::to_owned));
        let endpoint_url = request.endpoint_url.to_owned();
        self.wait_gate().await;
        let settings = ConnectorSettings {
            credential_masked: Some("...Yeh6Q".into()),
            active_masked: self.applied.then(|| "878*****Yeh6Q".into()),
            is_active: self.applied,
            endpoint_url,
            connection_status: if self.applied {
                ConnectionStatus::Success
            } else {
                ConnectionStatus::Failed
            },
            ..ConnectorSettings::default()
        };
        *self.connector.lock().unwrap() = settings.clone();
        Ok(Applied {
            settings,
            applied: self.applied,
        })
    }

    async fn test_connector(&self) -> Result<ConnectivityReport, CoreError> {
        self.record("test_connector");
        Ok(ConnectivityReport {
            status: ConnectionStatus::Success,
            message: None,
        })
    }

    async fn activate_connector(&self) -> Result<ActivationReport, CoreError> {
        self.record("activate_connector");
        Ok(ActivationReport {
            activated: true,
            message: None,
        })
    }

    async fn delete_connector(&self) -> Result<ConnectorSettings, CoreError> {
        self.record("delete_connector");
        let settings = ConnectorSettings {
            endpoint_url: "https://api.telegram.org".into(),
            ..ConnectorSettings::default()
        };
        *self.connector.lock().unwrap() = settings.clone();
        Ok(settings)
    }

    async fn delete_connector_credential(&self) -> Result<ConnectorSettings, CoreError> {
        self.record("delete_connector_credential");
        let mut connector = self.connector.lock().unwrap();
        connector.credential_masked = None;
        connector.active_masked = None;
        connector.is_active = false;
        connector.connection_status = ConnectionStatus::NotConfigured;
        Ok(connector.clone())
    }

    async fn replace_provider(
        &self,
        request: ProviderReplace<'_>,
    ) -> Result<Applied<ProviderSettings>, CoreError> {
        self.record("replace_provider");
        let call = ReplaceCall {
            provider_type: request.provider_type.to_owned(),
            api_key: request.api_key.map(ToOwned::to_owned),
            endpoint_url: request.endpoint_url.to_owned(),
            model: request.model.to_owned(),
            project_id: request.project_id.map(ToOwned::to_owned),
        };
        self.provider_replaces.lock().unwrap().push(call.clone());
        let settings = ProviderSettings {
            provider_type: Some(call.provider_type),
            credential_masked: Some("...abcde".into()),
            active_masked: Some("sk-*****abcde".into()),
            is_active: true,
            endpoint_url: call.endpoint_url,
            model: call.model,
            project_id: call.project_id,
            connection_status: ConnectionStatus::Success,
            ..ProviderSettings::default()
        };
        *self.provider.lock().unwrap() = settings.clone();
        Ok(Applied {
            settings,
            applied: true,
        })
    }

    async fn patch_provider(&self, request: ProviderPatch<'_>) -> Result<ProviderSettings, CoreError> {
        self.record("patch_provider");
        self.provider_patches.lock().unwrap().push(PatchCall {
            model: request.model.to_owned(),
            system_prompt: request.system_prompt.map(ToOwned::to_owned),
            project_id: request.project_id.map(|p| p.map(ToOwned::to_owned)),
        });
        let mut provider = self.provider.lock().unwrap();
        provider.model = request.model.to_owned();
        provider.system_prompt = request.system_prompt.map(ToOwned::to_owned);
        if let Some(project_id) = request.project_id {
            provider.project_id = project_id.map(ToOwned::to_owned);
        }
        Ok(provider.clone())
    }

    async fn test_provider(&self) -> Result<ConnectivityReport, CoreError> {
        self.record("test_provider");
        Err(CoreError::Timeout)
    }

    async fn activate_provider(&self) -> Result<ActivationReport, CoreError> {
        self.record("activate_provider");
        Ok(ActivationReport {
            activated: false,
            message: Some("Key rejected".into()),
        })
    }

    async fn delete_provider(&self) -> Result<ProviderSettings, CoreError> {
        self.record("delete_provider");
        *self.provider.lock().unwrap() = ProviderSettings::default();
        Ok(ProviderSettings::default())
    }

    async fn delete_provider_credential(&self) -> Result<ProviderSettings, CoreError> {
        self.record("delete_provider_credential");
        let mut provider = self.provider.lock().unwrap();
        provider.credential_masked = None;
        provider.active_masked = None;
        provider.is_active = false;
        Ok(provider.clone())
    }

    async fn list_provider_catalog(&self) -> Result<Vec<ProviderCatalogEntry>, CoreError> {
        self.record("list_provider_catalog");
        Ok(self.catalog.clone())
    }

    async fn fetch_live_models(
        &self,
        _project_id: Option<&str>,
    ) -> Result<Vec<ModelInfo>, CoreError> {
        self.record("fetch_live_models");
        self.wait_gate().await;
        Ok(self.live_models.clone())
    }

    async fn list_tools(&self) -> Result<ToolListing, CoreError> {
        self.record("list_tools");
        Ok(ToolListing::default())
    }

    async fn get_tool_schema(&self, _name: &str) -> Result<ToolSchema, CoreError> {
        self.record("get_tool_schema");
        Ok(ToolSchema {
            plugin_id: "worklogs".into(),
            schema: vec![
                FieldSpec {
                    key: "jira_url".into(),
                    label: "Jira URL".into(),
                    kind: FieldKind::String,
                    required: true,
                    default: None,
                    description: None,
                },
                FieldSpec {
                    key: "api_token".into(),
                    label: "API token".into(),
                    kind: FieldKind::Password,
                    required: true,
                    default: None,
                    description: None,
                },
            ],
            current: json!({"api_token": "***ab12c"}).as_object().cloned().unwrap(),
        })
    }

    async fn put_tool_settings(
        &self,
        _name: &str,
        settings: &ToolSettings,
    ) -> Result<ToolReport, CoreError> {
        self.record("put_tool_settings");
        self.tool_puts.lock().unwrap().push(settings.clone());
        Ok(ToolReport {
            success: true,
            message: Some("Settings saved".into()),
        })
    }

    async fn test_tool(&self, _name: &str) -> Result<ToolReport, CoreError> {
        self.record("test_tool");
        Ok(ToolReport {
            success: false,
            message: Some("Jira unreachable".into()),
        })
    }

    async fn enable_tool(&self, _name: &str) -> Result<ToolReport, CoreError> {
        self.record("enable_tool");
        Err(CoreError::Rejected {
            message: "Tool 'get_worklogs' requires configuration".into(),
            missing_settings: vec!["jira_url".into(), "api_token".into()],
        })
    }

    async fn disable_tool(&self, _name: &str) -> Result<ToolReport, CoreError> {
        self.record("disable_tool");
        Ok(ToolReport {
            success: true,
            message: None,
        })
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn bound_connector() -> ConnectorSettings {
    ConnectorSettings {
        credential_masked: Some("...Yeh6Q".into()),
        active_masked: Some("878*****Yeh6Q".into()),
        is_active: true,
        endpoint_url: "https://api.telegram.org".into(),
        connection_status: ConnectionStatus::Success,
        ..ConnectorSettings::default()
    }
}

fn bound_provider() -> ProviderSettings {
    ProviderSettings {
        provider_type: Some("openai".into()),
        credential_masked: Some("...abcde".into()),
        active_masked: Some("sk-*****abcde".into()),
        is_active: true,
        endpoint_url: "https://api.openai.com/v1".into(),
        model: "gpt-4o".into(),
        connection_status: ConnectionStatus::Success,
        ..ProviderSettings::default()
    }
}

fn catalog() -> Vec<ProviderCatalogEntry> {
    vec![
        ProviderCatalogEntry {
            id: "openai".into(),
            name: "OpenAI".into(),
            default_base_url: "https://api.openai.com/v1".into(),
            models: ModelTiers {
                standard: vec!["gpt-4o".into(), "gpt-4o-mini".into()],
                reasoning: vec!["o3-mini".into()],
            },
        },
        ProviderCatalogEntry {
            id: "anthropic".into(),
            name: "Anthropic".into(),
            default_base_url: "https://api.anthropic.com".into(),
            models: ModelTiers {
                standard: vec!["claude-3-5-haiku-latest".into()],
                reasoning: vec![],
            },
        },
    ]
}

fn backend(connector: ConnectorSettings, provider: ProviderSettings) -> FakeBackend {
    FakeBackend {
        connector: Mutex::new(connector),
        provider: Mutex::new(provider),
        catalog: catalog(),
        applied: true,
        ..FakeBackend::default()
    }
}

async fn open(backend: FakeBackend) -> AdminSession<FakeBackend> {
    let session = AdminSession::new(backend, SessionConfig::default());
    session.open().await.unwrap();
    session
}

struct Answer(bool);

impl ConfirmPresenter for Answer {
    fn present(&self, _prompt: &ConfirmPrompt, responder: ConfirmResponder) {
        if self.0 {
            responder.confirm();
        } else {
            responder.cancel();
        }
    }
}

// ── Open / polling ──────────────────────────────────────────────────

#[tokio::test]
async fn open_starts_polling_only_where_a_credential_is_stored() {
    let session = open(backend(bound_connector(), ProviderSettings::default())).await;

    assert!(session.is_polling(IntegrationKind::Connector));
    assert!(!session.is_polling(IntegrationKind::Provider));
    assert_eq!(session.connector_status().status, ConnectionStatus::Success);
    assert_eq!(session.backend().count("list_provider_catalog"), 1);
    session.close();
    assert!(!session.is_polling(IntegrationKind::Connector));
}

#[tokio::test(start_paused = true)]
async fn clearing_stops_the_poller_and_ticks_stop_calling() {
    let session = open(backend(bound_connector(), ProviderSettings::default())).await;

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(session.backend().count("test_connector"), 1);

    session.clear_connector().await.unwrap();
    assert!(!session.is_polling(IntegrationKind::Connector));
    assert!(session.connector_snapshot().unwrap().credential_masked.is_none());

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(session.backend().count("test_connector"), 1);
}

#[tokio::test]
async fn failed_manual_check_publishes_failed_and_one_notice() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut notices = session.notices();

    let report = session.test_provider().await;

    assert_eq!(report.status, ConnectionStatus::Failed);
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.integration, Some(IntegrationKind::Provider));
    assert!(notices.try_recv().is_err());
    session.close();
}

// ── Connector saves ─────────────────────────────────────────────────

#[tokio::test]
async fn connector_save_without_any_credential_sends_nothing() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let mut form = session.connector_form();

    let err = session.save_connector(&mut form).await.unwrap_err();

    assert_eq!(err.field_errors()[0].key, "credential");
    assert_eq!(session.backend().count("replace_connector"), 0);
}

#[tokio::test]
async fn connector_save_clears_typed_token_and_shows_new_mask() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let mut form = session.connector_form();
    form.credential.set_typed("123456:ABC");
    form.endpoint_url = "  ".into();

    let outcome = session.save_connector(&mut form).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Applied { .. }));
    assert!(!form.credential.has_typed());
    assert_eq!(form.credential.placeholder(), "...Yeh6Q");
    assert_eq!(
        session.backend().connector_tokens.lock().unwrap().clone(),
        vec![Some("123456:ABC".to_owned())]
    );
    assert_eq!(
        session.connector_snapshot().unwrap().endpoint_url,
        "https://api.telegram.org"
    );
    assert!(session.is_polling(IntegrationKind::Connector));

    let again = session.save_connector(&mut form).await.unwrap();
    assert_eq!(again, SaveOutcome::NoChanges);
    assert_eq!(session.backend().count("replace_connector"), 1);
    session.close();
}

#[tokio::test]
async fn connector_saved_but_not_applied_is_its_own_outcome() {
    let mut fake = backend(ConnectorSettings::default(), ProviderSettings::default());
    fake.applied = false;
    let session = open(fake).await;
    let mut notices = session.notices();
    let mut form = session.connector_form();
    form.credential.set_typed("bad-token");

    let outcome = session.save_connector(&mut form).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::SavedNotApplied { .. }));
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
    session.close();
}

#[tokio::test]
async fn overlapping_connector_saves_are_rejected() {
    let gate = Arc::new(Notify::new());
    let mut fake = backend(ConnectorSettings::default(), ProviderSettings::default());
    fake.gate = Some(Arc::clone(&gate));
    let session = open(fake).await;

    let first = session.clone();
    let mut first_form = session.connector_form();
    first_form.credential.set_typed("123:first");
    let handle = tokio::spawn(async move { first.save_connector(&mut first_form).await });
    tokio::task::yield_now().await;

    let mut second_form = session.connector_form();
    second_form.credential.set_typed("123:second");
    let err = session.save_connector(&mut second_form).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::SaveInProgress {
            integration: IntegrationKind::Connector
        }
    ));

    gate.notify_one();
    assert!(handle.await.unwrap().is_ok());
    assert_eq!(session.backend().count("replace_connector"), 1);
    session.close();
}

// ── Provider saves ──────────────────────────────────────────────────

#[tokio::test]
async fn untouched_provider_form_is_a_no_op() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut form = session.provider_form();

    let outcome = session.save_provider(&mut form).await.unwrap();

    assert_eq!(outcome, SaveOutcome::NoChanges);
    assert_eq!(session.backend().count("replace_provider"), 0);
    assert_eq!(session.backend().count("patch_provider"), 0);
    session.close();
}

#[tokio::test]
async fn model_only_edit_is_a_partial_update() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut notices = session.notices();
    let mut form = session.provider_form();
    form.selected_model = "gpt-4o-mini".into();

    let outcome = session.save_provider(&mut form).await.unwrap();

    let SaveOutcome::Patched { changes } = outcome else {
        panic!("expected a partial update, got {outcome:?}");
    };
    assert_eq!(changes.fields().collect::<Vec<_>>(), vec![TrackedField::Model]);
    assert_eq!(
        session.backend().provider_patches.lock().unwrap().clone(),
        vec![PatchCall {
            model: "gpt-4o-mini".into(),
            system_prompt: None,
            project_id: None,
        }]
    );
    assert_eq!(session.backend().count("replace_provider"), 0);
    assert_eq!(session.provider_snapshot().unwrap().model, "gpt-4o-mini");
    assert_eq!(notices.try_recv().unwrap().message, "Model changed to gpt-4o-mini");
    session.close();
}

#[tokio::test]
async fn clearing_project_id_patches_an_explicit_null() {
    let mut provider = bound_provider();
    provider.project_id = Some("proj_1".into());
    let session = open(backend(ConnectorSettings::default(), provider)).await;
    let mut form = session.provider_form();
    form.project_id = "   ".into();

    session.save_provider(&mut form).await.unwrap();

    let patches = session.backend().provider_patches.lock().unwrap().clone();
    assert_eq!(patches[0].project_id, Some(None));
    session.close();
}

#[tokio::test]
async fn gateway_snapshot_without_api_version_loads_unchanged() {
    let azure = ProviderSettings {
        provider_type: Some("azure".into()),
        endpoint_url: "https://corp.openai.azure.com".into(),
        gateway_endpoint: Some("https://corp.openai.azure.com".into()),
        api_version: None,
        ..bound_provider()
    };
    let session = open(backend(ConnectorSettings::default(), azure)).await;
    let mut form = session.provider_form();
    assert_eq!(form.api_version, "");

    let outcome = session.save_provider(&mut form).await.unwrap();

    assert_eq!(outcome, SaveOutcome::NoChanges);
    assert_eq!(session.backend().count("replace_provider"), 0);
    assert_eq!(session.backend().count("patch_provider"), 0);

    session.select_provider(&mut form, "azure");
    assert_eq!(form.api_version, "2024-02-15-preview");
    session.close();
}

#[tokio::test]
async fn project_id_is_not_sent_for_unscoped_providers() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut form = session.provider_form();

    session.select_provider(&mut form, "anthropic");
    form.selected_model = "claude-3-5-haiku-latest".into();
    form.project_id = "proj_1".into();
    session.save_provider(&mut form).await.unwrap();

    let replaces = session.backend().provider_replaces.lock().unwrap().clone();
    assert_eq!(replaces[0].project_id, None);
    session.close();
}

#[tokio::test]
async fn provider_switch_with_blank_key_is_a_full_replace() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut form = session.provider_form();

    session.select_provider(&mut form, "anthropic");
    assert_eq!(form.endpoint_url, "https://api.anthropic.com");
    form.selected_model = "claude-3-5-haiku-latest".into();

    let outcome = session.save_provider(&mut form).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Applied { .. }));
    let replaces = session.backend().provider_replaces.lock().unwrap().clone();
    assert_eq!(replaces.len(), 1);
    assert_eq!(replaces[0].provider_type, "anthropic");
    assert_eq!(replaces[0].api_key, None);
    assert_eq!(session.backend().count("patch_provider"), 0);
    session.close();
}

#[tokio::test]
async fn key_without_model_saves_with_placeholder_model() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let mut form = session.provider_form();
    form.provider_type = "openai".into();
    form.credential.set_typed("sk-new");

    session.save_provider(&mut form).await.unwrap();

    let replaces = session.backend().provider_replaces.lock().unwrap().clone();
    assert_eq!(replaces[0].model, "gpt-4o");
    assert_eq!(replaces[0].endpoint_url, "https://api.openai.com/v1");
    assert_eq!(replaces[0].api_key.as_deref(), Some("sk-new"));
    assert!(!form.credential.has_typed());

    let again = session.save_provider(&mut form).await.unwrap();
    assert_eq!(again, SaveOutcome::NoChanges);
    assert_eq!(session.backend().count("replace_provider"), 1);
    assert_eq!(session.backend().count("patch_provider"), 0);
    session.close();
}

#[tokio::test]
async fn refused_activation_warns_and_reloads() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut notices = session.notices();

    let report = session.activate_provider().await.unwrap();

    assert!(!report.activated);
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.message, "Key rejected");
    assert_eq!(session.backend().count("get_settings"), 2);
    session.close();
}

// ── Unbind ──────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_unbind_sends_nothing() {
    let session = open(backend(bound_connector(), ProviderSettings::default())).await;

    let outcome = session.unbind_connector_token(&Answer(false)).await.unwrap();

    assert_eq!(outcome, UnbindOutcome::Cancelled);
    assert_eq!(session.backend().count("delete_connector_credential"), 0);
    assert!(session.is_polling(IntegrationKind::Connector));
    session.close();
}

#[tokio::test]
async fn confirmed_unbind_deletes_credential_and_stops_polling() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    assert!(session.is_polling(IntegrationKind::Provider));

    let outcome = session.unbind_provider_key(&Answer(true)).await.unwrap();

    assert_eq!(outcome, UnbindOutcome::Unbound);
    assert_eq!(session.backend().count("delete_provider_credential"), 1);
    assert!(!session.is_polling(IntegrationKind::Provider));
    let snapshot = session.provider_snapshot().unwrap();
    assert!(snapshot.credential_masked.is_none());
    assert_eq!(snapshot.model, "gpt-4o");
}

// ── Models ──────────────────────────────────────────────────────────

#[tokio::test]
async fn model_listing_for_a_deselected_provider_is_discarded() {
    let gate = Arc::new(Notify::new());
    let mut fake = backend(ConnectorSettings::default(), bound_provider());
    fake.gate = Some(Arc::clone(&gate));
    fake.live_models = vec![ModelInfo {
        id: "gpt-4o".into(),
        display_name: None,
    }];
    let session = open(fake).await;

    let fetching = session.clone();
    let handle =
        tokio::spawn(async move { fetching.fetch_live_models("openai", None, None).await });
    tokio::task::yield_now().await;

    let mut form = session.provider_form();
    session.select_provider(&mut form, "anthropic");
    gate.notify_one();

    assert_eq!(handle.await.unwrap().unwrap(), ModelFetch::Stale);
    session.close();
}

#[tokio::test]
async fn live_listing_groups_reasoning_first() {
    let mut fake = backend(ConnectorSettings::default(), bound_provider());
    fake.live_models = vec![
        ModelInfo {
            id: "gpt-4o".into(),
            display_name: None,
        },
        ModelInfo {
            id: "o3-mini".into(),
            display_name: Some("o3 mini".into()),
        },
    ];
    let session = open(fake).await;

    let ModelFetch::Ready(menu) = session
        .fetch_live_models("openai", Some("gpt-4o"), None)
        .await
        .unwrap()
    else {
        panic!("listing should be current");
    };

    let ids: Vec<_> = menu.options().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["o3-mini", "gpt-4o"]);
    assert_eq!(menu.selected.as_deref(), Some("gpt-4o"));
    session.close();
}

#[tokio::test]
async fn model_choices_follow_provider_capabilities() {
    let session = open(backend(ConnectorSettings::default(), bound_provider())).await;
    let mut form = session.provider_form();

    assert_eq!(
        session.model_choices(&form),
        ModelChoices::Loading
    );
    session.select_provider(&mut form, "anthropic");
    assert_eq!(
        session.model_choices(&form),
        ModelChoices::NeedsCredential
    );
    session.select_provider(&mut form, "custom");
    assert!(matches!(
        session.model_choices(&form),
        ModelChoices::FreeText { .. }
    ));
    session.close();
}

// ── Tools ───────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_tool_form_is_rejected_before_the_request() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let surface = session.open_tool("get_worklogs").await.unwrap();

    let err = session.save_tool(&surface).await.unwrap_err();

    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].key, "jira_url");
    assert_eq!(session.backend().count("put_tool_settings"), 0);
}

#[tokio::test]
async fn tool_save_omits_blank_stored_password() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let mut surface = session.open_tool("get_worklogs").await.unwrap();
    surface.form.set_text("jira_url", "https://jira.example.com");

    let report = session.save_tool(&surface).await.unwrap();

    assert!(report.success);
    let puts = session.backend().tool_puts.lock().unwrap().clone();
    assert_eq!(
        serde_json::Value::Object(puts[0].clone()),
        json!({"jira_url": "https://jira.example.com"})
    );
}

#[tokio::test]
async fn enabling_unconfigured_tool_lists_missing_settings() {
    let session = open(backend(ConnectorSettings::default(), ProviderSettings::default())).await;
    let mut notices = session.notices();

    let err = session.enable_tool("get_worklogs").await.unwrap_err();

    let CoreError::Rejected {
        missing_settings, ..
    } = err
    else {
        panic!("expected a rejection");
    };
    assert_eq!(missing_settings, vec!["jira_url".to_owned(), "api_token".to_owned()]);
    assert!(notices.try_recv().unwrap().message.contains("missing: jira_url, api_token"));
}
