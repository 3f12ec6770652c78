// Integration tests for `AdminClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use botdesk_api::types::{
    ConnectorReplaceRequest, FetchModelsRequest, ProviderPatchRequest, ProviderReplaceRequest,
};
use botdesk_api::{AdminClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AdminClient) {
    let server = MockServer::start().await;
    let client = AdminClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn settings_body() -> serde_json::Value {
    json!({
        "telegram": {
            "accessToken": null,
            "accessTokenMasked": "...Yeh6Q",
            "activeTokenMasked": "878*****Yeh6Q",
            "baseUrl": "https://api.telegram.org",
            "connectionStatus": "success",
            "isActive": true,
            "lastActivatedAt": "2024-05-01T10:00:00.123456",
            "lastChecked": null
        },
        "llm": {
            "llmType": "openai",
            "apiKey": null,
            "apiKeyMasked": "...abcde",
            "activeTokenMasked": null,
            "baseUrl": "https://api.openai.com/v1",
            "modelType": "gpt-4o",
            "systemPrompt": null,
            "azureEndpoint": null,
            "apiVersion": null,
            "projectId": "proj_1",
            "connectionStatus": "failed",
            "isActive": false,
            "lastActivatedAt": null,
            "lastChecked": null
        }
    })
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_settings_parses_both_blocks() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_body()))
        .mount(&server)
        .await;

    let settings = client.get_settings().await.unwrap();

    assert_eq!(settings.telegram.access_token_masked.as_deref(), Some("...Yeh6Q"));
    assert!(settings.telegram.is_active);
    assert_eq!(settings.llm.llm_type.as_deref(), Some("openai"));
    assert_eq!(settings.llm.model_type.as_deref(), Some("gpt-4o"));
    assert_eq!(settings.llm.project_id.as_deref(), Some("proj_1"));
    assert_eq!(settings.llm.connection_status.as_deref(), Some("failed"));
}

#[tokio::test]
async fn test_admin_key_header_is_sent() {
    let server = MockServer::start().await;
    let key = SecretString::from("s3cret".to_owned());
    let client = AdminClient::new(&server.uri(), Some(&key), &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .and(header("X-Admin-Key", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_body()))
        .expect(1)
        .mount(&server)
        .await;

    client.get_settings().await.unwrap();
}

#[tokio::test]
async fn test_forbidden_maps_to_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "Admin access required"})),
        )
        .mount(&server)
        .await;

    let err = client.get_settings().await.unwrap_err();
    match err {
        Error::Unauthorized { message } => assert_eq!(message, "Admin access required"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_replace_connector_sends_null_token() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings/telegram"))
        .and(body_json(json!({
            "accessToken": null,
            "baseUrl": "https://tg.example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "telegram": { "accessTokenMasked": "...Yeh6Q", "isActive": false,
                          "baseUrl": "https://tg.example.com", "connectionStatus": "failed" },
            "applied": false
        })))
        .mount(&server)
        .await;

    let resp = client
        .replace_connector(&ConnectorReplaceRequest {
            access_token: None,
            base_url: "https://tg.example.com",
        })
        .await
        .unwrap();

    assert!(!resp.applied);
    assert_eq!(resp.telegram.base_url.as_deref(), Some("https://tg.example.com"));
}

#[tokio::test]
async fn test_replace_connector_400_keeps_detail_message() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings/telegram"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Access Token is required"})),
        )
        .mount(&server)
        .await;

    let err = client
        .replace_connector(&ConnectorReplaceRequest {
            access_token: None,
            base_url: "https://api.telegram.org",
        })
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Access Token is required");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ── Provider ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_replace_provider_omits_gateway_fields_when_unset() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings/llm"))
        .and(body_json(json!({
            "llmType": "anthropic",
            "apiKey": "sk-ant",
            "baseUrl": "https://api.anthropic.com",
            "modelType": "claude-3-5-haiku",
            "systemPrompt": null,
            "projectId": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "llm": { "llmType": "anthropic", "apiKeyMasked": "...t-ant", "modelType": "claude-3-5-haiku",
                     "isActive": true, "activeTokenMasked": "sk-***t-ant", "connectionStatus": "success" },
            "applied": true
        })))
        .mount(&server)
        .await;

    let resp = client
        .replace_provider(&ProviderReplaceRequest {
            llm_type: "anthropic",
            api_key: Some("sk-ant"),
            base_url: "https://api.anthropic.com",
            model_type: "claude-3-5-haiku",
            system_prompt: None,
            project_id: None,
            azure_endpoint: None,
            api_version: None,
        })
        .await
        .unwrap();

    assert!(resp.applied);
    assert_eq!(resp.llm.active_token_masked.as_deref(), Some("sk-***t-ant"));
}

#[tokio::test]
async fn test_patch_provider_clears_project_id_explicitly() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/settings/llm"))
        .and(body_json(json!({
            "modelType": "gpt-4o-mini",
            "systemPrompt": "Be brief",
            "projectId": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "llm": { "llmType": "openai", "modelType": "gpt-4o-mini", "systemPrompt": "Be brief" },
            "applied": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .patch_provider(&ProviderPatchRequest {
            model_type: "gpt-4o-mini",
            system_prompt: Some("Be brief"),
            azure_endpoint: None,
            api_version: None,
            project_id: Some(None),
        })
        .await
        .unwrap();

    assert_eq!(resp.llm.model_type.as_deref(), Some("gpt-4o-mini"));
}

#[tokio::test]
async fn test_fetch_models_reports_provider_error_in_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/settings/llm/fetch-models"))
        .and(body_json(json!({ "projectId": "proj_9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [],
            "error": "API key is required"
        })))
        .mount(&server)
        .await;

    let resp = client
        .fetch_models(&FetchModelsRequest {
            project_id: Some("proj_9"),
        })
        .await
        .unwrap();

    assert!(resp.models.is_empty());
    assert_eq!(resp.error.as_deref(), Some("API key is required"));
}

#[tokio::test]
async fn test_list_providers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings/llm/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "providers": [
                { "id": "openai", "name": "OpenAI", "defaultBaseUrl": "https://api.openai.com/v1",
                  "models": { "standard": ["gpt-4o", "gpt-4o-mini"], "reasoning": ["o1"] } },
                { "id": "custom", "name": "Custom", "defaultBaseUrl": "",
                  "models": { "standard": [], "reasoning": [] } }
            ]
        })))
        .mount(&server)
        .await;

    let providers = client.list_providers().await.unwrap();

    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].models.standard, vec!["gpt-4o", "gpt-4o-mini"]);
    assert_eq!(providers[1].default_base_url.as_deref(), Some(""));
}

#[tokio::test]
async fn test_delete_provider_key_returns_fresh_block() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/settings/llm/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "llm": { "llmType": "openai", "apiKeyMasked": "", "isActive": false }
        })))
        .mount(&server)
        .await;

    let resp = client.delete_provider_key().await.unwrap();
    assert_eq!(resp.llm.api_key_masked.as_deref(), Some(""));
    assert!(!resp.llm.is_active);
}

// ── Tools ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tool_settings_schema() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tools/get_worklogs/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plugin_id": "worklog_checker",
            "settings": { "jira_url": "https://jira", "jira_token": "***abcd" },
            "schema": [
                { "key": "jira_url", "label": "Jira URL", "type": "string", "required": true },
                { "key": "jira_token", "label": "Token", "type": "password", "required": true }
            ]
        })))
        .mount(&server)
        .await;

    let resp = client.get_tool_settings("get_worklogs").await.unwrap();

    assert_eq!(resp.plugin_id, "worklog_checker");
    assert_eq!(resp.schema.len(), 2);
    assert_eq!(resp.schema[1].kind, "password");
    assert_eq!(resp.settings["jira_token"], json!("***abcd"));
}

#[tokio::test]
async fn test_put_tool_settings_validation_errors() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/tools/get_worklogs/settings"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": {
                "success": false,
                "message": "Validation failed",
                "errors": [ { "field": "jira_url", "error": "Required field is empty" } ]
            }
        })))
        .mount(&server)
        .await;

    let settings = serde_json::Map::new();
    let err = client
        .put_tool_settings("get_worklogs", &settings)
        .await
        .unwrap_err();

    match err {
        Error::Api {
            status,
            message,
            field_errors,
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Validation failed");
            assert_eq!(field_errors.len(), 1);
            assert_eq!(field_errors[0].field, "jira_url");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_enable_tool_missing_settings() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tools/get_worklogs/enable"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": {
                "success": false,
                "message": "Tool 'get_worklogs' requires configuration",
                "missing_settings": ["jira_url", "jira_token"]
            }
        })))
        .mount(&server)
        .await;

    let err = client.enable_tool("get_worklogs").await.unwrap_err();
    match err {
        Error::Api {
            missing_settings, ..
        } => assert_eq!(missing_settings, vec!["jira_url", "jira_token"]),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_tools() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tools": [
                { "name": "calculate", "description": "Math", "plugin_id": "calculator",
                  "plugin_name": "Calculator", "enabled": true, "needs_config": false, "has_settings": false }
            ],
            "total": 1,
            "enabled_count": 1
        })))
        .mount(&server)
        .await;

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.total, 1);
    assert_eq!(tools.tools[0].plugin_name, "Calculator");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/settings/llm/test"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.test_provider().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("upstream down"));
}
