// ── Core error types ──
//
// User-facing errors from botdesk-core. Consumers never see raw HTTP
// bodies or JSON parse failures; `From<botdesk_api::Error>` translates
// transport-layer errors into domain variants.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::IntegrationKind;

/// A problem attached to one input of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form key (`provider`, `model`, `credential`, or a tool schema key).
    pub key: String,
    pub message: String,
}

impl FieldError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authorization ────────────────────────────────────────────────
    #[error("Admin access required: {message}")]
    Unauthorized { message: String },

    // ── Validation (never reaches the network) ───────────────────────
    #[error("Validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("A {integration} save is already in progress")]
    SaveInProgress { integration: IntegrationKind },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach admin backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the admin backend timed out")]
    Timeout,

    #[error("Admin backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Backend decisions ────────────────────────────────────────────
    #[error("{message}")]
    Rejected {
        message: String,
        /// Settings the backend still needs (tool enable).
        missing_settings: Vec<String>,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unexpected payload from admin backend: {message}")]
    Payload { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Field-level errors carried by a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }

    /// Network-level failure (as opposed to a backend decision).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout | Self::Api { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<botdesk_api::Error> for CoreError {
    fn from(err: botdesk_api::Error) -> Self {
        match err {
            botdesk_api::Error::Unauthorized { message } => CoreError::Unauthorized { message },
            botdesk_api::Error::Transport(e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            botdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid backend URL: {e}"),
            },
            botdesk_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                url: "<tls>".into(),
                reason,
            },
            botdesk_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { message },
            botdesk_api::Error::Api {
                status: 400,
                field_errors,
                ..
            } if !field_errors.is_empty() => CoreError::Validation {
                errors: field_errors
                    .into_iter()
                    .map(|fe| FieldError::new(fe.field, fe.error))
                    .collect(),
            },
            botdesk_api::Error::Api {
                status: 400,
                message,
                missing_settings,
                ..
            } => CoreError::Rejected {
                message,
                missing_settings,
            },
            botdesk_api::Error::Api {
                status, message, ..
            } => CoreError::Api { status, message },
            botdesk_api::Error::Deserialization { message, .. } => CoreError::Payload { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_field_errors_become_validation() {
        let err: CoreError = botdesk_api::Error::Api {
            status: 400,
            message: "Validation failed".into(),
            missing_settings: vec![],
            field_errors: vec![botdesk_api::FieldIssue {
                field: "jira_url".into(),
                error: "Required field is empty".into(),
            }],
        }
        .into();
        assert_eq!(
            err.field_errors(),
            &[FieldError::new("jira_url", "Required field is empty")]
        );
    }

    #[test]
    fn missing_settings_become_rejection() {
        let err: CoreError = botdesk_api::Error::Api {
            status: 400,
            message: "Tool 'x' requires configuration".into(),
            missing_settings: vec!["token".into()],
            field_errors: vec![],
        }
        .into();
        match err {
            CoreError::Rejected {
                missing_settings, ..
            } => assert_eq!(missing_settings, vec!["token".to_owned()]),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn forbidden_is_unauthorized() {
        let err: CoreError = botdesk_api::Error::Unauthorized {
            message: "Admin access required".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Unauthorized { .. }));
        assert!(!err.is_transport());
    }
}
