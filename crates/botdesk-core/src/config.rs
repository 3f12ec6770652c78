// ── Runtime configuration ──
//
// These types describe how to reach the admin backend and how the session
// behaves. They never touch disk; the CLI builds them from its profiles.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::catalog::ReasoningPolicy;
use crate::model::DEFAULT_CONNECTOR_ENDPOINT;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on a private network).
    DangerAcceptInvalid,
}

/// How to reach one admin backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend root (e.g. `http://localhost:8000`); `/api/` is appended.
    pub url: Url,
    /// Sent as `X-Admin-Key` when present.
    pub admin_key: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

/// Per-provider capabilities that drive form behavior.
///
/// Provider ids are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    /// Providers that work without a credential (local runtimes).
    pub credential_exempt: Vec<String>,
    /// Providers whose model is typed in rather than picked.
    pub free_text_model: Vec<String>,
    /// Providers whose model list is fetched live from the backend.
    pub live_catalog: Vec<String>,
    /// Providers routed through an enterprise gateway endpoint.
    pub gateway: Vec<String>,
    /// Providers that accept a project id.
    pub project_scoped: Vec<String>,
    pub gateway_default_api_version: String,
    /// Model used when nothing else resolves.
    pub fallback_model: String,
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        let ids = |list: &[&str]| list.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
        Self {
            credential_exempt: ids(&["ollama"]),
            free_text_model: ids(&["custom"]),
            live_catalog: ids(&[
                "openai",
                "anthropic",
                "google",
                "groq",
                "openrouter",
                "ollama",
                "xai",
                "deepseek",
                "azure",
            ]),
            gateway: ids(&["azure"]),
            project_scoped: ids(&["openai"]),
            gateway_default_api_version: "2024-02-15-preview".into(),
            fallback_model: "gpt-4o".into(),
        }
    }
}

fn listed(list: &[String], id: &str) -> bool {
    let id = id.trim();
    !id.is_empty() && list.iter().any(|entry| entry.eq_ignore_ascii_case(id))
}

impl ProviderPolicy {
    pub fn is_credential_exempt(&self, id: &str) -> bool {
        listed(&self.credential_exempt, id)
    }

    pub fn uses_free_text_model(&self, id: &str) -> bool {
        listed(&self.free_text_model, id)
    }

    pub fn has_live_catalog(&self, id: &str) -> bool {
        listed(&self.live_catalog, id)
    }

    pub fn uses_gateway(&self, id: &str) -> bool {
        listed(&self.gateway, id)
    }

    pub fn uses_project_id(&self, id: &str) -> bool {
        listed(&self.project_scoped, id)
    }
}

/// Session behavior. `Default` reproduces the stock console.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between background connectivity checks.
    pub poll_interval: Duration,
    pub connector_default_endpoint: String,
    /// Placeholder shown in an empty connector token input.
    pub connector_placeholder: String,
    /// Placeholder shown in an empty provider key input.
    pub provider_placeholder: String,
    pub provider_policy: ProviderPolicy,
    pub reasoning: ReasoningPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            connector_default_endpoint: DEFAULT_CONNECTOR_ENDPOINT.into(),
            connector_placeholder: "Bot token".into(),
            provider_placeholder: "API key".into(),
            provider_policy: ProviderPolicy::default(),
            reasoning: ReasoningPolicy::default(),
        }
    }
}
