use thiserror::Error;

/// Top-level error type for the `botdesk-api` crate.
///
/// Covers transport failures, authorization rejections and structured
/// error bodies returned by the admin backend. `botdesk-core` maps these
/// into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The admin key was missing or rejected (HTTP 401/403).
    #[error("Admin access required: {message}")]
    Unauthorized { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success response carrying the backend's `detail` payload.
    #[error("Backend error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Settings a tool still needs before it can be enabled.
        missing_settings: Vec<String>,
        /// Per-field problems reported by the tool settings validator.
        field_errors: Vec<FieldIssue>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// One entry of the backend's `detail.errors` list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub error: String,
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the backend refused the admin key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status of a backend rejection, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
