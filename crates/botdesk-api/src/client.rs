// Async HTTP client for the botdesk admin settings backend.
//
// Base path: /api/
// Auth: X-Admin-Key header (optional when the backend runs without one)

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::FieldIssue;
use crate::transport::TransportConfig;
use crate::types;
use crate::Error;

/// Header carrying the admin key on every request.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
}

#[derive(serde::Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    missing_settings: Vec<String>,
    #[serde(default)]
    errors: Vec<FieldIssue>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the admin settings backend.
///
/// Every operation maps to exactly one REST call; no retries happen here.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an optional admin key and transport config.
    ///
    /// When a key is given it is injected as a sensitive `X-Admin-Key`
    /// default header.
    pub fn new(
        base_url: &str,
        admin_key: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(key) = admin_key {
            let mut value =
                HeaderValue::from_str(key.expose_secret()).map_err(|e| Error::Unauthorized {
                    message: format!("invalid admin key header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(ADMIN_KEY_HEADER, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/api/` so relative joins land under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The normalized `/api/` base this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `tools/{name}[/suffix]` with the tool name percent-encoded.
    fn tool_url(&self, name: &str, suffix: Option<&str>) -> Result<Url, Error> {
        let mut url = self.url("tools")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty().push(name);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let mut req = self.http.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PATCH {url}");
        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let detail = parse_detail(&raw);

        let message = detail
            .message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| (!raw.is_empty() && !detail.is_json).then(|| raw.clone()))
            .unwrap_or_else(|| status.to_string());

        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Error::Unauthorized { message };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            missing_settings: detail.missing_settings,
            field_errors: detail.errors,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// `GET /api/settings`
    pub async fn get_settings(&self) -> Result<types::SettingsResponse, Error> {
        self.get(self.url("settings")?).await
    }

    /// `PUT /api/settings/telegram`
    pub async fn replace_connector(
        &self,
        body: &types::ConnectorReplaceRequest<'_>,
    ) -> Result<types::ConnectorReplaceResponse, Error> {
        self.put(self.url("settings/telegram")?, body).await
    }

    /// `POST /api/settings/telegram/test`
    pub async fn test_connector(&self) -> Result<types::ConnectivityResponse, Error> {
        self.post::<_, ()>(self.url("settings/telegram/test")?, None)
            .await
    }

    /// `POST /api/settings/telegram/activate`
    pub async fn activate_connector(&self) -> Result<types::ActivationResponse, Error> {
        self.post::<_, ()>(self.url("settings/telegram/activate")?, None)
            .await
    }

    /// `DELETE /api/settings/telegram`
    pub async fn delete_connector(&self) -> Result<types::ConnectorEnvelope, Error> {
        self.delete(self.url("settings/telegram")?).await
    }

    /// `DELETE /api/settings/telegram/token`
    pub async fn delete_connector_token(&self) -> Result<types::ConnectorEnvelope, Error> {
        self.delete(self.url("settings/telegram/token")?).await
    }

    /// `PUT /api/settings/llm`
    pub async fn replace_provider(
        &self,
        body: &types::ProviderReplaceRequest<'_>,
    ) -> Result<types::ProviderReplaceResponse, Error> {
        self.put(self.url("settings/llm")?, body).await
    }

    /// `PATCH /api/settings/llm`
    pub async fn patch_provider(
        &self,
        body: &types::ProviderPatchRequest<'_>,
    ) -> Result<types::ProviderEnvelope, Error> {
        self.patch(self.url("settings/llm")?, body).await
    }

    /// `POST /api/settings/llm/test`
    pub async fn test_provider(&self) -> Result<types::ConnectivityResponse, Error> {
        self.post::<_, ()>(self.url("settings/llm/test")?, None).await
    }

    /// `POST /api/settings/llm/activate`
    pub async fn activate_provider(&self) -> Result<types::ActivationResponse, Error> {
        self.post::<_, ()>(self.url("settings/llm/activate")?, None)
            .await
    }

    /// `DELETE /api/settings/llm`
    pub async fn delete_provider(&self) -> Result<types::ProviderEnvelope, Error> {
        self.delete(self.url("settings/llm")?).await
    }

    /// `DELETE /api/settings/llm/token`
    pub async fn delete_provider_key(&self) -> Result<types::ProviderEnvelope, Error> {
        self.delete(self.url("settings/llm/token")?).await
    }

    /// `GET /api/settings/llm/providers`
    pub async fn list_providers(&self) -> Result<Vec<types::ProviderCatalogResponse>, Error> {
        let resp: types::ProvidersResponse = self.get(self.url("settings/llm/providers")?).await?;
        Ok(resp.providers)
    }

    /// `POST /api/settings/llm/fetch-models`
    ///
    /// The backend answers 200 with `error` set when the provider refused;
    /// callers decide how to surface that.
    pub async fn fetch_models(
        &self,
        body: &types::FetchModelsRequest<'_>,
    ) -> Result<types::FetchModelsResponse, Error> {
        self.post(self.url("settings/llm/fetch-models")?, Some(body))
            .await
    }

    // ── Tools ────────────────────────────────────────────────────────

    /// `GET /api/tools`
    pub async fn list_tools(&self) -> Result<types::ToolsResponse, Error> {
        self.get(self.url("tools")?).await
    }

    /// `GET /api/tools/{name}/settings`
    pub async fn get_tool_settings(&self, name: &str) -> Result<types::ToolSettingsResponse, Error> {
        self.get(self.tool_url(name, Some("settings"))?).await
    }

    /// `PUT /api/tools/{name}/settings`
    pub async fn put_tool_settings(
        &self,
        name: &str,
        settings: &Map<String, Value>,
    ) -> Result<types::ToolActionResponse, Error> {
        let body = types::ToolSettingsRequest { settings };
        self.put(self.tool_url(name, Some("settings"))?, &body)
            .await
    }

    /// `POST /api/tools/{name}/test`
    pub async fn test_tool(&self, name: &str) -> Result<types::ToolActionResponse, Error> {
        self.post::<_, ()>(self.tool_url(name, Some("test"))?, None)
            .await
    }

    /// `POST /api/tools/{name}/enable`
    pub async fn enable_tool(&self, name: &str) -> Result<types::ToolActionResponse, Error> {
        self.post::<_, ()>(self.tool_url(name, Some("enable"))?, None)
            .await
    }

    /// `POST /api/tools/{name}/disable`
    pub async fn disable_tool(&self, name: &str) -> Result<types::ToolActionResponse, Error> {
        self.post::<_, ()>(self.tool_url(name, Some("disable"))?, None)
            .await
    }
}

// ── Error detail extraction ──────────────────────────────────────────

struct ParsedDetail {
    is_json: bool,
    message: Option<String>,
    missing_settings: Vec<String>,
    errors: Vec<FieldIssue>,
}

/// `detail` is either a plain string or `{message, missing_settings, errors}`.
fn parse_detail(raw: &str) -> ParsedDetail {
    let Ok(body) = serde_json::from_str::<ErrorResponse>(raw) else {
        return ParsedDetail {
            is_json: false,
            message: None,
            missing_settings: Vec::new(),
            errors: Vec::new(),
        };
    };

    match body.detail {
        Some(Value::String(message)) => ParsedDetail {
            is_json: true,
            message: Some(message),
            missing_settings: Vec::new(),
            errors: Vec::new(),
        },
        Some(obj @ Value::Object(_)) => {
            let detail: ErrorDetail = serde_json::from_value(obj).unwrap_or_default();
            ParsedDetail {
                is_json: true,
                message: detail.message,
                missing_settings: detail.missing_settings,
                errors: detail.errors,
            }
        }
        _ => ParsedDetail {
            is_json: true,
            message: None,
            missing_settings: Vec::new(),
            errors: Vec::new(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_suffix_once() {
        let a = AdminClient::normalize_base_url("http://localhost:8000").unwrap();
        let b = AdminClient::normalize_base_url("http://localhost:8000/api/").unwrap();
        let c = AdminClient::normalize_base_url("https://host/admin").unwrap();
        assert_eq!(a.as_str(), "http://localhost:8000/api/");
        assert_eq!(b.as_str(), "http://localhost:8000/api/");
        assert_eq!(c.as_str(), "https://host/admin/api/");
    }

    #[test]
    fn tool_names_are_percent_encoded() {
        let client =
            AdminClient::from_reqwest("http://localhost:8000", reqwest::Client::new()).unwrap();
        let url = client.tool_url("odd name/x", Some("settings")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/tools/odd%20name%2Fx/settings"
        );
    }

    #[test]
    fn detail_object_yields_missing_settings() {
        let raw = r#"{"detail":{"success":false,"message":"needs config","missing_settings":["jira_token"]}}"#;
        let detail = parse_detail(raw);
        assert_eq!(detail.message.as_deref(), Some("needs config"));
        assert_eq!(detail.missing_settings, vec!["jira_token".to_owned()]);
    }

    #[test]
    fn non_json_body_is_not_parsed() {
        let detail = parse_detail("Bad Gateway");
        assert!(!detail.is_json);
        assert!(detail.message.is_none());
    }
}
