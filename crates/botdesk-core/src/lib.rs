// botdesk-core: Settings reconciliation engine between botdesk-api and admin surfaces.

pub mod backend;
pub mod catalog;
pub mod change;
pub mod config;
pub mod confirm;
pub mod convert;
pub mod credential;
pub mod error;
pub mod form;
pub mod model;
pub mod notice;
pub mod poller;
pub mod schema_form;
pub mod session;
pub mod store;
pub mod stream;
pub mod validity;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{
    Applied, ConnectorReplace, ProviderPatch, ProviderReplace, SettingsBackend, connect_backend,
};
pub use catalog::{ModelChoices, ModelFetch, ReasoningPolicy, ReasoningRule};
pub use change::{ChangeSet, SaveRoute, TrackedField};
pub use config::{BackendConfig, ProviderPolicy, SessionConfig, TlsVerification};
pub use confirm::{ConfirmPresenter, ConfirmPrompt, ConfirmResponder, ConfirmationGate, Decision};
pub use credential::{BoundCredential, CredentialField, CredentialPresence};
pub use error::{CoreError, FieldError};
pub use form::{ConnectorForm, ProviderForm};
pub use notice::{Notice, NoticeLevel};
pub use poller::{ConnectivityPoller, ConnectivityProbe, StatusReport};
pub use schema_form::{FieldInput, FormState, InputValue};
pub use session::{AdminSession, SaveOutcome, ToolSurface, UnbindOutcome};
pub use store::SnapshotStore;
pub use stream::StatusStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Integrations
    ActivationReport, ConnectionStatus, ConnectivityReport, ConnectorSettings, IntegrationKind,
    ProviderSettings,
    // Provider catalog
    ModelInfo, ModelMenu, ModelTier, ProviderCatalogEntry,
    // Tools
    FieldKind, FieldSpec, ToolListing, ToolReport, ToolSchema, ToolSettings, ToolSummary,
};
