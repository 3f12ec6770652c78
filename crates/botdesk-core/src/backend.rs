// ── Settings backend seam ──
//
// Every network operation the session performs, expressed in domain
// types. `AdminClient` is the production implementation; tests plug in
// an in-memory fake.

use async_trait::async_trait;
use tracing::debug;

use botdesk_api::transport::{TlsMode, TransportConfig};
use botdesk_api::{AdminClient, types};

use crate::config::{BackendConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    ActivationReport, ConnectivityReport, ConnectorSettings, ModelInfo, ProviderCatalogEntry,
    ProviderSettings, ToolListing, ToolReport, ToolSchema, ToolSettings,
};

// ── Requests ─────────────────────────────────────────────────────────

/// Full connector replacement. `access_token: None` keeps the stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorReplace<'a> {
    pub access_token: Option<&'a str>,
    pub endpoint_url: &'a str,
}

/// Full provider replacement. `api_key: None` keeps the stored key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderReplace<'a> {
    pub provider_type: &'a str,
    pub api_key: Option<&'a str>,
    pub endpoint_url: &'a str,
    pub model: &'a str,
    pub system_prompt: Option<&'a str>,
    pub project_id: Option<&'a str>,
    /// Only sent for gateway providers.
    pub gateway_endpoint: Option<&'a str>,
    pub api_version: Option<&'a str>,
}

/// Partial provider update for non-identity fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderPatch<'a> {
    pub model: &'a str,
    pub system_prompt: Option<&'a str>,
    pub gateway_endpoint: Option<&'a str>,
    pub api_version: Option<&'a str>,
    /// Outer `None`: untouched. `Some(None)`: cleared.
    pub project_id: Option<Option<&'a str>>,
}

/// A saved snapshot plus whether the running service picked it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub settings: T,
    pub applied: bool,
}

// ── Trait ────────────────────────────────────────────────────────────

#[async_trait]
pub trait SettingsBackend: Send + Sync + 'static {
    async fn get_settings(&self) -> Result<(ConnectorSettings, ProviderSettings), CoreError>;

    async fn replace_connector(
        &self,
        request: ConnectorReplace<'_>,
    ) -> Result<Applied<ConnectorSettings>, CoreError>;
    async fn test_connector(&self) -> Result<ConnectivityReport, CoreError>;
    async fn activate_connector(&self) -> Result<ActivationReport, CoreError>;
    async fn delete_connector(&self) -> Result<ConnectorSettings, CoreError>;
    async fn delete_connector_credential(&self) -> Result<ConnectorSettings, CoreError>;

    async fn replace_provider(
        &self,
        request: ProviderReplace<'_>,
    ) -> Result<Applied<ProviderSettings>, CoreError>;
    async fn patch_provider(&self, request: ProviderPatch<'_>)
    -> Result<ProviderSettings, CoreError>;
    async fn test_provider(&self) -> Result<ConnectivityReport, CoreError>;
    async fn activate_provider(&self) -> Result<ActivationReport, CoreError>;
    async fn delete_provider(&self) -> Result<ProviderSettings, CoreError>;
    async fn delete_provider_credential(&self) -> Result<ProviderSettings, CoreError>;

    async fn list_provider_catalog(&self) -> Result<Vec<ProviderCatalogEntry>, CoreError>;
    /// Live listing for the saved provider credentials.
    async fn fetch_live_models(&self, project_id: Option<&str>)
    -> Result<Vec<ModelInfo>, CoreError>;

    async fn list_tools(&self) -> Result<ToolListing, CoreError>;
    async fn get_tool_schema(&self, name: &str) -> Result<ToolSchema, CoreError>;
    async fn put_tool_settings(
        &self,
        name: &str,
        settings: &ToolSettings,
    ) -> Result<ToolReport, CoreError>;
    async fn test_tool(&self, name: &str) -> Result<ToolReport, CoreError>;
    async fn enable_tool(&self, name: &str) -> Result<ToolReport, CoreError>;
    async fn disable_tool(&self, name: &str) -> Result<ToolReport, CoreError>;
}

// ── AdminClient implementation ───────────────────────────────────────

#[async_trait]
impl SettingsBackend for AdminClient {
    async fn get_settings(&self) -> Result<(ConnectorSettings, ProviderSettings), CoreError> {
        let raw = AdminClient::get_settings(self).await?;
        Ok((raw.telegram.into(), raw.llm.into()))
    }

    async fn replace_connector(
        &self,
        request: ConnectorReplace<'_>,
    ) -> Result<Applied<ConnectorSettings>, CoreError> {
        let body = types::ConnectorReplaceRequest {
            access_token: request.access_token,
            base_url: request.endpoint_url,
        };
        let resp = AdminClient::replace_connector(self, &body).await?;
        Ok(Applied {
            settings: resp.telegram.into(),
            applied: resp.applied,
        })
    }

    async fn test_connector(&self) -> Result<ConnectivityReport, CoreError> {
        Ok(AdminClient::test_connector(self).await?.into())
    }

    async fn activate_connector(&self) -> Result<ActivationReport, CoreError> {
        Ok(AdminClient::activate_connector(self).await?.into())
    }

    async fn delete_connector(&self) -> Result<ConnectorSettings, CoreError> {
        Ok(AdminClient::delete_connector(self).await?.telegram.into())
    }

    async fn delete_connector_credential(&self) -> Result<ConnectorSettings, CoreError> {
        Ok(AdminClient::delete_connector_token(self)
            .await?
            .telegram
            .into())
    }

    async fn replace_provider(
        &self,
        request: ProviderReplace<'_>,
    ) -> Result<Applied<ProviderSettings>, CoreError> {
        let body = types::ProviderReplaceRequest {
            llm_type: request.provider_type,
            api_key: request.api_key,
            base_url: request.endpoint_url,
            model_type: request.model,
            system_prompt: request.system_prompt,
            project_id: request.project_id,
            azure_endpoint: request.gateway_endpoint,
            api_version: request.api_version,
        };
        let resp = AdminClient::replace_provider(self, &body).await?;
        Ok(Applied {
            settings: resp.llm.into(),
            applied: resp.applied,
        })
    }

    async fn patch_provider(
        &self,
        request: ProviderPatch<'_>,
    ) -> Result<ProviderSettings, CoreError> {
        let body = types::ProviderPatchRequest {
            model_type: request.model,
            system_prompt: request.system_prompt,
            azure_endpoint: request.gateway_endpoint,
            api_version: request.api_version,
            project_id: request.project_id,
        };
        Ok(AdminClient::patch_provider(self, &body).await?.llm.into())
    }

    async fn test_provider(&self) -> Result<ConnectivityReport, CoreError> {
        Ok(AdminClient::test_provider(self).await?.into())
    }

    async fn activate_provider(&self) -> Result<ActivationReport, CoreError> {
        Ok(AdminClient::activate_provider(self).await?.into())
    }

    async fn delete_provider(&self) -> Result<ProviderSettings, CoreError> {
        Ok(AdminClient::delete_provider(self).await?.llm.into())
    }

    async fn delete_provider_credential(&self) -> Result<ProviderSettings, CoreError> {
        Ok(AdminClient::delete_provider_key(self).await?.llm.into())
    }

    async fn list_provider_catalog(&self) -> Result<Vec<ProviderCatalogEntry>, CoreError> {
        let providers = AdminClient::list_providers(self).await?;
        Ok(providers.into_iter().map(Into::into).collect())
    }

    async fn fetch_live_models(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<ModelInfo>, CoreError> {
        let body = types::FetchModelsRequest { project_id };
        let resp = AdminClient::fetch_models(self, &body).await?;
        if let Some(error) = resp.error.filter(|e| !e.trim().is_empty()) {
            debug!(%error, "live model listing refused");
            return Err(CoreError::Rejected {
                message: error,
                missing_settings: Vec::new(),
            });
        }
        Ok(resp.models.into_iter().map(Into::into).collect())
    }

    async fn list_tools(&self) -> Result<ToolListing, CoreError> {
        Ok(AdminClient::list_tools(self).await?.into())
    }

    async fn get_tool_schema(&self, name: &str) -> Result<ToolSchema, CoreError> {
        AdminClient::get_tool_settings(self, name).await?.try_into()
    }

    async fn put_tool_settings(
        &self,
        name: &str,
        settings: &ToolSettings,
    ) -> Result<ToolReport, CoreError> {
        Ok(AdminClient::put_tool_settings(self, name, settings)
            .await?
            .into())
    }

    async fn test_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        Ok(AdminClient::test_tool(self, name).await?.into())
    }

    async fn enable_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        Ok(AdminClient::enable_tool(self, name).await?.into())
    }

    async fn disable_tool(&self, name: &str) -> Result<ToolReport, CoreError> {
        Ok(AdminClient::disable_tool(self, name).await?.into())
    }
}

// ── Construction ─────────────────────────────────────────────────────

/// Build the HTTP backend for `config`.
pub fn connect_backend(config: &BackendConfig) -> Result<AdminClient, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    };
    let client = AdminClient::new(config.url.as_str(), config.admin_key.as_ref(), &transport)?;
    debug!(base = %client.base_url(), "admin backend client ready");
    Ok(client)
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
