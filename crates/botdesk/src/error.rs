//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use botdesk_config::ConfigError;
use botdesk_core::{CoreError, IntegrationKind};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the admin backend at {url}")]
    #[diagnostic(
        code(botdesk::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("{integration} connectivity check failed: {message}")]
    #[diagnostic(
        code(botdesk::check_failed),
        help("Verify the stored credential, then run: botdesk {integration} test")
    )]
    CheckFailed {
        integration: IntegrationKind,
        message: String,
    },

    #[error("{integration} settings were saved but the service did not start")]
    #[diagnostic(
        code(botdesk::not_applied),
        help(
            "The settings are stored. Check the credential and retry with:\n\
             botdesk {integration} activate"
        )
    )]
    NotApplied { integration: IntegrationKind },

    #[error("{integration} was not activated: {message}")]
    #[diagnostic(
        code(botdesk::activation_refused),
        help("Save a working credential first: botdesk {integration} save")
    )]
    ActivationRefused {
        integration: IntegrationKind,
        message: String,
    },

    #[error("Tool '{name}' failed: {message}")]
    #[diagnostic(
        code(botdesk::tool_failed),
        help("Review its settings with: botdesk tools show {name}")
    )]
    ToolFailed { name: String, message: String },

    // ── Authorization ────────────────────────────────────────────────

    #[error("Admin key required")]
    #[diagnostic(
        code(botdesk::unauthorized),
        help(
            "The backend rejected the request: {message}\n\
             Pass --admin-key, set BOTDESK_ADMIN_KEY, or run: botdesk config set-key"
        )
    )]
    Unauthorized { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Not found: {message}")]
    #[diagnostic(code(botdesk::not_found), help("Run: botdesk tools list"))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(botdesk::rejected),
        help("Missing settings: {missing}\nSet them with: botdesk tools configure <name> --set KEY=VALUE")
    )]
    Rejected { message: String, missing: String },

    #[error("A {integration} save is already in progress")]
    #[diagnostic(code(botdesk::busy))]
    Busy { integration: IntegrationKind },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(botdesk::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(botdesk::validation))]
    Validation { field: String, reason: String },

    #[error("Fill in the required fields")]
    #[diagnostic(code(botdesk::invalid_form), help("{summary}"))]
    InvalidForm { summary: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(botdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: botdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(botdesk::no_config),
        help(
            "Create a profile with: botdesk config init\n\
             Or pass --backend / set BOTDESK_BACKEND.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(botdesk::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(botdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request to the admin backend timed out")]
    #[diagnostic(
        code(botdesk::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::CheckFailed { .. }
            | Self::NotApplied { .. }
            | Self::ToolFailed { .. } => exit_code::CONNECTION,
            Self::Unauthorized { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::InvalidForm { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => CliError::Unauthorized { message },

            CoreError::Validation { errors } => CliError::InvalidForm {
                summary: errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::SaveInProgress { integration } => CliError::Busy { integration },

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { status, message } => CliError::ApiError {
                code: status.to_string(),
                message,
            },

            CoreError::Rejected {
                message,
                missing_settings,
            } => CliError::Rejected {
                message,
                missing: if missing_settings.is_empty() {
                    "(none reported)".into()
                } else {
                    missing_settings.join(", ")
                },
            },

            CoreError::NotFound { message } => CliError::NotFound { message },

            CoreError::Payload { message } => CliError::ApiError {
                code: "payload".into(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}
