// ── Provider catalog types ──

use serde::Serialize;
use strum::Display;

/// Static preset models a provider ships with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelTiers {
    pub standard: Vec<String>,
    pub reasoning: Vec<String>,
}

/// One entry of the provider catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCatalogEntry {
    pub id: String,
    pub name: String,
    /// Empty when the provider has no canonical endpoint (custom, gateway).
    pub default_base_url: String,
    pub models: ModelTiers,
}

impl ProviderCatalogEntry {
    /// First standard preset, else first reasoning preset.
    pub fn first_preset(&self) -> Option<&str> {
        self.models
            .standard
            .first()
            .or_else(|| self.models.reasoning.first())
            .map(String::as_str)
    }

    pub fn has_preset(&self, id: &str) -> bool {
        self.models.standard.iter().any(|m| m == id) || self.models.reasoning.iter().any(|m| m == id)
    }
}

/// A model from the provider's live listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: Option<String>,
}

impl ModelInfo {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// Grouping tier of a model. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    #[strum(serialize = "Standard")]
    Standard,
    #[strum(serialize = "Reasoning")]
    Reasoning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelGroup {
    pub tier: ModelTier,
    pub options: Vec<ModelOption>,
}

/// Grouped model options plus the option that should be preselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelMenu {
    pub groups: Vec<ModelGroup>,
    pub selected: Option<String>,
}

impl ModelMenu {
    pub fn contains(&self, id: &str) -> bool {
        self.options().any(|o| o.id == id)
    }

    pub fn options(&self) -> impl Iterator<Item = &ModelOption> {
        self.groups.iter().flat_map(|g| g.options.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.options.is_empty())
    }
}
