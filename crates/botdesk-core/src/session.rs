// ── Admin session ──
//
// Explicit context object for one admin surface: the backend, the last
// snapshots, the provider catalog cache, one connectivity poller per
// integration, and per-integration save guards. Saves run validation,
// change detection and routing before anything reaches the network.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::backend::{ConnectorReplace, ProviderPatch, ProviderReplace, SettingsBackend};
use crate::catalog::{
    ModelChoices, ModelFetch, RelevanceGuard, live_menu, placeholder_model, static_menu,
};
use crate::change::{
    ChangeSet, SaveRoute, TrackedField, detect_connector_changes, detect_provider_changes,
    resolve_endpoint,
};
use crate::config::SessionConfig;
use crate::confirm::{ConfirmPresenter, ConfirmPrompt, ConfirmationGate};
use crate::credential::{CredentialPresence, PresenceCell};
use crate::error::CoreError;
use crate::form::{ConnectorForm, ProviderForm, connector_binding, provider_binding};
use crate::model::{
    ActivationReport, ConnectivityReport, ConnectorSettings, IntegrationKind, ModelMenu,
    ProviderCatalogEntry, ProviderSettings, ToolListing, ToolReport, ToolSchema,
};
use crate::notice::Notice;
use crate::poller::{ConnectivityPoller, ConnectivityProbe, StatusReport};
use crate::schema_form::FormState;
use crate::store::SnapshotStore;
use crate::stream::StatusStream;
use crate::validity::{
    connector_form_valid, effective_model, provider_form_valid, validate_connector_submit,
    validate_provider_submit,
};

const NOTICE_CHANNEL_SIZE: usize = 64;

const ADMIN_KEY_REQUIRED: &str = "Admin key required (X-Admin-Key header)";
const REQUIRED_FIELDS: &str = "Fill in the required fields";
const SAVED_AND_APPLIED: &str = "Settings saved and applied";
const SAVED_NOT_APPLIED: &str = "Connection failed. Service stopped. Check the token";

// ── Outcomes ─────────────────────────────────────────────────────────

/// Result of a save that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing differed from the snapshot; no request was sent.
    NoChanges,
    /// Full replace accepted and picked up by the running service.
    Applied { changes: ChangeSet },
    /// Full replace stored, but the service could not start with it.
    SavedNotApplied { changes: ChangeSet },
    /// Partial update of non-identity fields.
    Patched { changes: ChangeSet },
}

impl SaveOutcome {
    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            Self::NoChanges => None,
            Self::Applied { changes }
            | Self::SavedNotApplied { changes }
            | Self::Patched { changes } => Some(changes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbindOutcome {
    Unbound,
    /// The prompt was cancelled or dismissed; nothing was sent.
    Cancelled,
}

/// An open tool settings surface.
#[derive(Debug, Clone)]
pub struct ToolSurface {
    pub name: String,
    pub schema: ToolSchema,
    pub form: FormState,
}

// ── Probe ────────────────────────────────────────────────────────────

struct BackendProbe<B> {
    backend: Arc<B>,
    kind: IntegrationKind,
    presence: Arc<PresenceCell>,
}

#[async_trait]
impl<B: SettingsBackend> ConnectivityProbe for BackendProbe<B> {
    fn credential_present(&self) -> bool {
        self.presence.get().is_usable()
    }

    async fn test(&self) -> Result<ConnectivityReport, CoreError> {
        match self.kind {
            IntegrationKind::Connector => self.backend.test_connector().await,
            IntegrationKind::Provider => self.backend.test_provider().await,
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Cheaply cloneable handle to one admin session.
pub struct AdminSession<B: SettingsBackend> {
    inner: Arc<SessionInner<B>>,
}

impl<B: SettingsBackend> Clone for AdminSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<B: SettingsBackend> {
    backend: Arc<B>,
    config: SessionConfig,
    store: SnapshotStore,
    catalog: ArcSwapOption<Vec<ProviderCatalogEntry>>,
    connector_poller: Arc<ConnectivityPoller>,
    provider_poller: Arc<ConnectivityPoller>,
    connector_presence: Arc<PresenceCell>,
    provider_presence: Arc<PresenceCell>,
    connector_save: Mutex<()>,
    provider_save: Mutex<()>,
    model_guard: RelevanceGuard,
    notices: broadcast::Sender<Notice>,
}

impl<B: SettingsBackend> AdminSession<B> {
    /// Create a session. Does NOT load anything; call [`open()`](Self::open).
    pub fn new(backend: B, config: SessionConfig) -> Self {
        let backend = Arc::new(backend);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let connector_presence = Arc::new(PresenceCell::default());
        let provider_presence = Arc::new(PresenceCell::default());

        let poller = |kind, presence: &Arc<PresenceCell>| {
            let probe = BackendProbe {
                backend: Arc::clone(&backend),
                kind,
                presence: Arc::clone(presence),
            };
            Arc::new(ConnectivityPoller::new(
                kind,
                config.poll_interval,
                Arc::new(probe),
                notices.clone(),
            ))
        };
        let connector_poller = poller(IntegrationKind::Connector, &connector_presence);
        let provider_poller = poller(IntegrationKind::Provider, &provider_presence);

        Self {
            inner: Arc::new(SessionInner {
                backend,
                config,
                store: SnapshotStore::new(),
                catalog: ArcSwapOption::empty(),
                connector_poller,
                provider_poller,
                connector_presence,
                provider_presence,
                connector_save: Mutex::new(()),
                provider_save: Mutex::new(()),
                model_guard: RelevanceGuard::default(),
                notices,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    /// Transient user notices, one per attempt.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    fn notify(&self, notice: Notice) {
        let _ = self.inner.notices.send(notice);
    }

    /// Send the error notice for a failed operation and hand the error back.
    fn fail(&self, kind: Option<IntegrationKind>, err: CoreError) -> CoreError {
        let notice = if matches!(err, CoreError::Unauthorized { .. }) {
            Notice::warning(ADMIN_KEY_REQUIRED)
        } else {
            Notice::error(err.to_string())
        };
        self.notify(match kind {
            Some(kind) => notice.for_integration(kind),
            None => notice,
        });
        err
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load both snapshots and the provider catalog, then start polling
    /// for each integration that has a stored credential.
    pub async fn open(&self) -> Result<(), CoreError> {
        self.reload().await?;

        if let Err(e) = self.provider_catalog().await {
            warn!(error = %e, "provider catalog unavailable");
            self.notify(Notice::warning(format!("Provider list unavailable: {e}")));
        }

        if self.inner.connector_presence.get().is_usable() {
            self.inner.connector_poller.start();
        }
        if self.inner.provider_presence.get().is_usable() {
            self.inner.provider_poller.start();
        }
        info!("admin session opened");
        Ok(())
    }

    /// Replace both snapshots from the backend.
    pub async fn reload(&self) -> Result<(), CoreError> {
        let (connector, provider) = self
            .inner
            .backend
            .get_settings()
            .await
            .map_err(|e| self.fail(None, e))?;

        if let Some(provider_type) = provider.provider_type.as_deref() {
            self.inner.model_guard.set(provider_type);
        }
        self.apply_connector(connector);
        self.apply_provider(provider);
        debug!(revision = self.inner.store.revision(), "settings snapshot loaded");
        Ok(())
    }

    /// Stop polling and drop the snapshots.
    pub fn close(&self) {
        self.inner.connector_poller.stop();
        self.inner.provider_poller.stop();
        self.inner.store.clear();
        self.inner.connector_presence.set(CredentialPresence::Absent);
        self.inner.provider_presence.set(CredentialPresence::Absent);
        debug!("admin session closed");
    }

    fn apply_connector(&self, settings: ConnectorSettings) {
        let form = ConnectorForm::from_snapshot(Some(&settings), &self.inner.config);
        self.inner.connector_presence.set(CredentialPresence::of(
            &form.credential,
            &connector_binding(Some(&settings)),
        ));
        self.inner
            .connector_poller
            .publish(StatusReport::from_status(settings.connection_status));
        self.inner.store.replace_connector(settings);
    }

    fn apply_provider(&self, settings: ProviderSettings) {
        let form = ProviderForm::from_snapshot(Some(&settings), &self.inner.config);
        self.inner.provider_presence.set(CredentialPresence::of(
            &form.credential,
            &provider_binding(Some(&settings)),
        ));
        self.inner
            .provider_poller
            .publish(StatusReport::from_status(settings.connection_status));
        self.inner.store.replace_provider(settings);
    }

    // ── Snapshots and status ─────────────────────────────────────────

    pub fn connector_snapshot(&self) -> Option<Arc<ConnectorSettings>> {
        self.inner.store.connector()
    }

    pub fn provider_snapshot(&self) -> Option<Arc<ProviderSettings>> {
        self.inner.store.provider()
    }

    pub fn connector_status(&self) -> StatusReport {
        self.inner.connector_poller.status()
    }

    pub fn provider_status(&self) -> StatusReport {
        self.inner.provider_poller.status()
    }

    pub fn subscribe_connector(&self) -> StatusStream {
        self.inner.connector_poller.subscribe()
    }

    pub fn subscribe_provider(&self) -> StatusStream {
        self.inner.provider_poller.subscribe()
    }

    pub fn is_polling(&self, kind: IntegrationKind) -> bool {
        self.poller(kind).is_polling()
    }

    fn poller(&self, kind: IntegrationKind) -> &Arc<ConnectivityPoller> {
        match kind {
            IntegrationKind::Connector => &self.inner.connector_poller,
            IntegrationKind::Provider => &self.inner.provider_poller,
        }
    }

    // ── Forms and validity ───────────────────────────────────────────

    pub fn connector_form(&self) -> ConnectorForm {
        ConnectorForm::from_snapshot(self.connector_snapshot().as_deref(), &self.inner.config)
    }

    pub fn provider_form(&self) -> ProviderForm {
        ProviderForm::from_snapshot(self.provider_snapshot().as_deref(), &self.inner.config)
    }

    /// Validity of an edited connector form. Also records credential
    /// presence so the next poll tick sees what the user typed.
    pub fn connector_valid(&self, form: &ConnectorForm) -> bool {
        let snapshot = self.connector_snapshot();
        self.inner.connector_presence.set(CredentialPresence::of(
            &form.credential,
            &connector_binding(snapshot.as_deref()),
        ));
        connector_form_valid(form, snapshot.as_deref())
    }

    /// Provider counterpart of [`connector_valid`](Self::connector_valid).
    pub fn provider_valid(&self, form: &ProviderForm) -> bool {
        let snapshot = self.provider_snapshot();
        self.inner.provider_presence.set(CredentialPresence::of(
            &form.credential,
            &provider_binding(snapshot.as_deref()),
        ));
        provider_form_valid(form, snapshot.as_deref(), &self.inner.config.provider_policy)
    }

    // ── Connector ────────────────────────────────────────────────────

    pub async fn save_connector(&self, form: &mut ConnectorForm) -> Result<SaveOutcome, CoreError> {
        let kind = IntegrationKind::Connector;
        let _guard = self
            .inner
            .connector_save
            .try_lock()
            .map_err(|_| CoreError::SaveInProgress { integration: kind })?;

        let snapshot = self.connector_snapshot();
        if let Err(errors) = validate_connector_submit(form, snapshot.as_deref()) {
            self.notify(Notice::warning(REQUIRED_FIELDS).for_integration(kind));
            return Err(CoreError::Validation { errors });
        }

        let default_endpoint = &self.inner.config.connector_default_endpoint;
        let changes = detect_connector_changes(form, snapshot.as_deref(), default_endpoint);
        if changes.is_empty() {
            debug!("connector form unchanged, nothing to save");
            self.notify(Notice::success("No changes").for_integration(kind));
            return Ok(SaveOutcome::NoChanges);
        }

        let endpoint_url = resolve_endpoint(&form.endpoint_url, default_endpoint).to_owned();
        info!(changes = %changes, "replacing connector settings");
        let saved = self
            .inner
            .backend
            .replace_connector(ConnectorReplace {
                access_token: form.credential.typed_secret(),
                endpoint_url: &endpoint_url,
            })
            .await
            .map_err(|e| self.fail(Some(kind), e))?;

        form.credential
            .apply_saved(saved.settings.credential_masked.as_deref());
        form.endpoint_url.clone_from(&saved.settings.endpoint_url);
        self.apply_connector(saved.settings);
        self.inner.connector_poller.start();

        Ok(self.full_save_outcome(kind, saved.applied, changes))
    }

    fn full_save_outcome(&self, kind: IntegrationKind, applied: bool, changes: ChangeSet) -> SaveOutcome {
        if applied {
            info!(integration = %kind, "settings saved and applied");
            self.notify(Notice::success(SAVED_AND_APPLIED).for_integration(kind));
            SaveOutcome::Applied { changes }
        } else {
            warn!(integration = %kind, "settings saved but not applied");
            self.notify(Notice::error(SAVED_NOT_APPLIED).for_integration(kind));
            SaveOutcome::SavedNotApplied { changes }
        }
    }

    /// Manual connectivity retry.
    pub async fn test_connector(&self) -> StatusReport {
        self.inner.connector_poller.check_now().await
    }

    /// Ask the backend to (re)start the bot with the stored token.
    pub async fn activate_connector(&self) -> Result<ActivationReport, CoreError> {
        let kind = IntegrationKind::Connector;
        let report = self
            .inner
            .backend
            .activate_connector()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.after_activation(kind, &report).await?;
        Ok(report)
    }

    /// Delete all connector settings.
    pub async fn clear_connector(&self) -> Result<(), CoreError> {
        let kind = IntegrationKind::Connector;
        let settings = self
            .inner
            .backend
            .delete_connector()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.inner.connector_poller.stop();
        self.apply_connector(settings);
        info!("connector settings cleared");
        self.notify(Notice::success("Bot credentials removed").for_integration(kind));
        Ok(())
    }

    /// Remove only the stored bot token, after confirmation.
    pub async fn unbind_connector_token<P: ConfirmPresenter + ?Sized>(
        &self,
        presenter: &P,
    ) -> Result<UnbindOutcome, CoreError> {
        let kind = IntegrationKind::Connector;
        let prompt = ConfirmPrompt::unbind("bot token", "bot");
        if !ConfirmationGate::confirm(presenter, &prompt).await.is_confirmed() {
            debug!("connector unbind cancelled");
            return Ok(UnbindOutcome::Cancelled);
        }

        let settings = self
            .inner
            .backend
            .delete_connector_credential()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.inner.connector_poller.stop();
        self.apply_connector(settings);
        info!("connector token unbound");
        self.notify(Notice::success("Token removed. Service stopped").for_integration(kind));
        Ok(UnbindOutcome::Unbound)
    }

    // ── Provider ─────────────────────────────────────────────────────

    pub async fn save_provider(&self, form: &mut ProviderForm) -> Result<SaveOutcome, CoreError> {
        let kind = IntegrationKind::Provider;
        let _guard = self
            .inner
            .provider_save
            .try_lock()
            .map_err(|_| CoreError::SaveInProgress { integration: kind })?;

        let policy = &self.inner.config.provider_policy;
        let snapshot = self.provider_snapshot();
        if let Err(errors) = validate_provider_submit(form, snapshot.as_deref(), policy) {
            self.notify(Notice::warning(REQUIRED_FIELDS).for_integration(kind));
            return Err(CoreError::Validation { errors });
        }

        let provider_type = form.provider_type.trim().to_owned();
        let entry = self.cached_entry(&provider_type);
        let catalog_default = entry.as_ref().map_or("", |e| e.default_base_url.as_str());
        let changes = detect_provider_changes(form, snapshot.as_deref(), policy, catalog_default);
        if changes.is_empty() {
            debug!("provider form unchanged, nothing to save");
            self.notify(Notice::success("No changes").for_integration(kind));
            return Ok(SaveOutcome::NoChanges);
        }

        let mut model = effective_model(form, policy).to_owned();
        if model.is_empty() {
            model = placeholder_model(entry.as_ref(), &policy.fallback_model);
            debug!(%model, "no model picked, using placeholder");
        }

        let gateway = policy.uses_gateway(&provider_type);
        let project_id = policy
            .uses_project_id(&provider_type)
            .then(|| non_blank(&form.project_id))
            .flatten();
        let system_prompt = non_blank(&form.system_prompt);
        let gateway_endpoint = gateway.then(|| non_blank(&form.gateway_endpoint)).flatten();
        let api_version = gateway.then(|| non_blank(&form.api_version)).flatten();

        match changes.route() {
            SaveRoute::NoOp => Ok(SaveOutcome::NoChanges),
            SaveRoute::PartialUpdate => {
                info!(changes = %changes, "patching provider settings");
                let settings = self
                    .inner
                    .backend
                    .patch_provider(ProviderPatch {
                        model: &model,
                        system_prompt,
                        gateway_endpoint,
                        api_version,
                        project_id: changes.contains(TrackedField::ProjectId).then_some(project_id),
                    })
                    .await
                    .map_err(|e| self.fail(Some(kind), e))?;

                form.set_model(settings.model.clone(), policy);
                self.apply_provider(settings);
                self.notify(Notice::success(patch_summary(&changes, &model)).for_integration(kind));
                Ok(SaveOutcome::Patched { changes })
            }
            SaveRoute::FullReplace => {
                let endpoint_url = resolve_endpoint(&form.endpoint_url, catalog_default).to_owned();
                info!(changes = %changes, provider = %provider_type, "replacing provider settings");
                let saved = self
                    .inner
                    .backend
                    .replace_provider(ProviderReplace {
                        provider_type: &provider_type,
                        api_key: form.credential.typed_secret(),
                        endpoint_url: &endpoint_url,
                        model: &model,
                        system_prompt,
                        project_id,
                        gateway_endpoint,
                        api_version,
                    })
                    .await
                    .map_err(|e| self.fail(Some(kind), e))?;

                form.credential
                    .apply_saved(saved.settings.credential_masked.as_deref());
                form.endpoint_url.clone_from(&saved.settings.endpoint_url);
                form.set_model(saved.settings.model.clone(), policy);
                self.inner.model_guard.set(&provider_type);
                self.apply_provider(saved.settings);
                self.inner.provider_poller.start();

                Ok(self.full_save_outcome(kind, saved.applied, changes))
            }
        }
    }

    pub async fn test_provider(&self) -> StatusReport {
        self.inner.provider_poller.check_now().await
    }

    pub async fn activate_provider(&self) -> Result<ActivationReport, CoreError> {
        let kind = IntegrationKind::Provider;
        let report = self
            .inner
            .backend
            .activate_provider()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.after_activation(kind, &report).await?;
        Ok(report)
    }

    pub async fn clear_provider(&self) -> Result<(), CoreError> {
        let kind = IntegrationKind::Provider;
        let settings = self
            .inner
            .backend
            .delete_provider()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.inner.provider_poller.stop();
        self.apply_provider(settings);
        info!("provider settings cleared");
        self.notify(Notice::success("Provider credentials removed").for_integration(kind));
        Ok(())
    }

    /// Remove only the stored API key, after confirmation.
    pub async fn unbind_provider_key<P: ConfirmPresenter + ?Sized>(
        &self,
        presenter: &P,
    ) -> Result<UnbindOutcome, CoreError> {
        let kind = IntegrationKind::Provider;
        let prompt = ConfirmPrompt::unbind("API key", "assistant");
        if !ConfirmationGate::confirm(presenter, &prompt).await.is_confirmed() {
            debug!("provider unbind cancelled");
            return Ok(UnbindOutcome::Cancelled);
        }

        let settings = self
            .inner
            .backend
            .delete_provider_credential()
            .await
            .map_err(|e| self.fail(Some(kind), e))?;
        self.inner.provider_poller.stop();
        self.apply_provider(settings);
        info!("provider key unbound");
        self.notify(Notice::success("Token removed. Service stopped").for_integration(kind));
        Ok(UnbindOutcome::Unbound)
    }

    async fn after_activation(
        &self,
        kind: IntegrationKind,
        report: &ActivationReport,
    ) -> Result<(), CoreError> {
        let message = report.message.clone();
        if report.activated {
            info!(integration = %kind, "service activated");
            self.notify(
                Notice::success(message.unwrap_or_else(|| "Service activated".into()))
                    .for_integration(kind),
            );
        } else {
            warn!(integration = %kind, "activation refused");
            self.notify(
                Notice::warning(message.unwrap_or_else(|| "Service was not activated".into()))
                    .for_integration(kind),
            );
        }

        self.reload().await?;
        let presence = match kind {
            IntegrationKind::Connector => &self.inner.connector_presence,
            IntegrationKind::Provider => &self.inner.provider_presence,
        };
        if presence.get().is_usable() {
            self.poller(kind).start();
        }
        Ok(())
    }

    // ── Provider catalog and models ──────────────────────────────────

    /// Static provider catalog, fetched once per session.
    pub async fn provider_catalog(&self) -> Result<Arc<Vec<ProviderCatalogEntry>>, CoreError> {
        if let Some(catalog) = self.inner.catalog.load_full() {
            return Ok(catalog);
        }
        let catalog = Arc::new(self.inner.backend.list_provider_catalog().await?);
        debug!(providers = catalog.len(), "provider catalog loaded");
        self.inner.catalog.store(Some(Arc::clone(&catalog)));
        Ok(catalog)
    }

    fn cached_entry(&self, provider_id: &str) -> Option<ProviderCatalogEntry> {
        let catalog = self.inner.catalog.load();
        catalog
            .as_ref()?
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(provider_id.trim()))
            .cloned()
    }

    /// Switch the form to another provider.
    ///
    /// Fills the catalog's default base URL, resets the model inputs,
    /// defaults the gateway API version and marks the provider as the one
    /// model listings belong to.
    pub fn select_provider(&self, form: &mut ProviderForm, provider_id: &str) -> ModelChoices {
        let policy = &self.inner.config.provider_policy;
        let provider_id = provider_id.trim();
        form.provider_type = provider_id.to_owned();
        self.inner.model_guard.set(provider_id);

        if let Some(entry) = self.cached_entry(provider_id) {
            if !entry.default_base_url.is_empty() {
                form.endpoint_url = entry.default_base_url;
            }
        }
        form.selected_model.clear();
        form.free_text_model.clear();
        if policy.uses_gateway(provider_id) && form.api_version.trim().is_empty() {
            form.api_version.clone_from(&policy.gateway_default_api_version);
        }

        let choices = self.model_choices(form);
        if let Some(menu) = choices.menu() {
            form.choose_from(menu, None);
        }
        choices
    }

    /// What the model picker should offer for the form's provider.
    pub fn model_choices(&self, form: &ProviderForm) -> ModelChoices {
        let policy = &self.inner.config.provider_policy;
        let provider_id = form.provider_type.trim();

        if policy.uses_free_text_model(provider_id) {
            return ModelChoices::FreeText {
                current: form.free_text_model.clone(),
            };
        }

        let has_key = self
            .provider_snapshot()
            .is_some_and(|s| s.has_key_for(provider_id));
        if !has_key {
            return ModelChoices::NeedsCredential;
        }
        if policy.has_live_catalog(provider_id) {
            return ModelChoices::Loading;
        }

        let selected = non_blank(&form.selected_model);
        match self.cached_entry(provider_id) {
            Some(entry) => ModelChoices::Static(static_menu(&entry, selected)),
            None => ModelChoices::Static(ModelMenu::default()),
        }
    }

    /// Fetch the live model listing for `provider_id`.
    ///
    /// Returns [`ModelFetch::Stale`] when another provider was selected
    /// while the request was in flight; the response is discarded.
    pub async fn fetch_live_models(
        &self,
        provider_id: &str,
        selected: Option<&str>,
        project_id: Option<&str>,
    ) -> Result<ModelFetch, CoreError> {
        let project_id = project_id.map(str::trim).filter(|p| !p.is_empty());
        let result = self.inner.backend.fetch_live_models(project_id).await;

        if !self.inner.model_guard.is_current(provider_id) {
            debug!(provider = provider_id, "discarding stale model listing");
            return Ok(ModelFetch::Stale);
        }

        let models = result.map_err(|e| self.fail(Some(IntegrationKind::Provider), e))?;
        debug!(provider = provider_id, count = models.len(), "live models fetched");
        Ok(ModelFetch::Ready(live_menu(
            &models,
            selected,
            &self.inner.config.reasoning,
        )))
    }

    // ── Tools ────────────────────────────────────────────────────────

    pub async fn list_tools(&self) -> Result<ToolListing, CoreError> {
        self.inner
            .backend
            .list_tools()
            .await
            .map_err(|e| self.fail(None, e))
    }

    /// Fetch a tool's schema and masked settings and render its form.
    pub async fn open_tool(&self, name: &str) -> Result<ToolSurface, CoreError> {
        let schema = self
            .inner
            .backend
            .get_tool_schema(name)
            .await
            .map_err(|e| self.fail(None, e))?;
        let form = FormState::render(&schema.schema, &schema.current);
        debug!(tool = name, fields = form.len(), "tool settings surface opened");
        Ok(ToolSurface {
            name: name.to_owned(),
            schema,
            form,
        })
    }

    /// Collect and submit a tool's settings. Field errors reject the save
    /// before any request is sent.
    pub async fn save_tool(&self, surface: &ToolSurface) -> Result<ToolReport, CoreError> {
        let settings = match surface.form.collect(&surface.schema.schema) {
            Ok(settings) => settings,
            Err(errors) => {
                self.notify(Notice::warning(REQUIRED_FIELDS));
                return Err(CoreError::Validation { errors });
            }
        };

        info!(tool = %surface.name, keys = settings.len(), "saving tool settings");
        let report = self
            .inner
            .backend
            .put_tool_settings(&surface.name, &settings)
            .await
            .map_err(|e| self.fail(None, e))?;
        self.notify(Notice::success(
            report.message.clone().unwrap_or_else(|| "Settings saved".into()),
        ));
        Ok(report)
    }

    pub async fn test_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        let report = self
            .inner
            .backend
            .test_tool(name)
            .await
            .map_err(|e| self.fail(None, e))?;
        let message = report.message.clone();
        self.notify(if report.success {
            Notice::success(message.unwrap_or_else(|| "Connection OK".into()))
        } else {
            Notice::error(message.unwrap_or_else(|| "Connection failed".into()))
        });
        Ok(report)
    }

    /// Enable a tool. A tool missing required settings is rejected with
    /// the list of what is missing.
    pub async fn enable_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        let report = self
            .inner
            .backend
            .enable_tool(name)
            .await
            .map_err(|e| match e {
                CoreError::Rejected {
                    message,
                    missing_settings,
                } => {
                    let text = if missing_settings.is_empty() {
                        message.clone()
                    } else {
                        format!("{message} (missing: {})", missing_settings.join(", "))
                    };
                    self.notify(Notice::error(text));
                    CoreError::Rejected {
                        message,
                        missing_settings,
                    }
                }
                other => self.fail(None, other),
            })?;
        info!(tool = name, "tool enabled");
        self.notify(Notice::success("Tool enabled"));
        Ok(report)
    }

    pub async fn disable_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        let report = self
            .inner
            .backend
            .disable_tool(name)
            .await
            .map_err(|e| self.fail(None, e))?;
        info!(tool = name, "tool disabled");
        self.notify(Notice::success("Tool disabled"));
        Ok(report)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Toast text for a partial provider update.
fn patch_summary(changes: &ChangeSet, model: &str) -> String {
    let model_changed = changes.contains(TrackedField::Model);
    let prompt_changed = changes.contains(TrackedField::SystemPrompt);
    let project_changed = changes.contains(TrackedField::ProjectId);

    match (model_changed, prompt_changed, project_changed) {
        (true, true, true) => "Model, system prompt and project ID updated".into(),
        (true, true, false) => "Model and system prompt updated".into(),
        (true, false, true) => format!("Model changed to {model} and project ID updated"),
        (false, true, true) => "System prompt and project ID updated".into(),
        (true, false, false) => format!("Model changed to {model}"),
        (false, true, false) => "System prompt updated".into(),
        (false, false, true) => "Project ID updated".into(),
        (false, false, false) => "Settings updated".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_summary_names_what_changed() {
        let changes = ChangeSet::from_fields([TrackedField::Model]);
        assert_eq!(patch_summary(&changes, "gpt-4o-mini"), "Model changed to gpt-4o-mini");

        let changes = ChangeSet::from_fields([TrackedField::SystemPrompt, TrackedField::ProjectId]);
        assert_eq!(patch_summary(&changes, "x"), "System prompt and project ID updated");
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" proj_1 "), Some("proj_1"));
    }
}
