// ── Domain model ──
//
// Types consumers see. Wire shapes stay in botdesk-api; `convert`
// turns them into these.

pub mod catalog;
pub mod integration;
pub mod schema;
pub mod tool;

pub use catalog::{
    ModelGroup, ModelInfo, ModelMenu, ModelOption, ModelTier, ModelTiers, ProviderCatalogEntry,
};
pub use integration::{
    ActivationReport, ConnectionStatus, ConnectivityReport, ConnectorSettings, IntegrationKind,
    ProviderSettings, DEFAULT_CONNECTOR_ENDPOINT,
};
pub use schema::{FieldKind, FieldSchema, FieldSpec, option_text};
pub use tool::{ToolListing, ToolReport, ToolSchema, ToolSettings, ToolSummary};
