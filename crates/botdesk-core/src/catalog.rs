// ── Provider catalog and model menus ──
//
// Static presets come from the backend's provider catalog; live listings
// are classified into tiers by an injectable rule table. Tiers only affect
// grouping, never what gets saved.

use std::sync::Mutex;

use regex::Regex;

use crate::model::{
    ModelGroup, ModelInfo, ModelMenu, ModelOption, ModelTier, ProviderCatalogEntry,
};

/// One classification rule: first matching rule wins.
#[derive(Debug, Clone)]
pub struct ReasoningRule {
    pub pattern: Regex,
    /// The rule is skipped when this also matches.
    pub unless: Option<Regex>,
    pub tier: ModelTier,
}

/// Ordered rule table mapping model ids/names to a tier.
#[derive(Debug, Clone)]
pub struct ReasoningPolicy {
    rules: Vec<ReasoningRule>,
}

const DEFAULT_REASONING_PATTERNS: &[(&str, Option<&str>)] = &[
    (r"\bo1\b", None),
    (r"^o3|\bo3\b", None),
    (r"^o4|\bo4\b", None),
    (r"\bgpt-5\b", None),
    (r"\breasoning\b", None),
    (r"\bthinking\b", None),
    (r"\bdeep.?think\b", None),
    (r"\breasoner\b", None),
    (r"gemini.*pro", Some("flash")),
    (r"gemini.*deep.?think", None),
    (r"claude.*sonnet.*202[4-9]", None),
    (r"claude.*opus.*202[4-9]", None),
    (r"deepseek.*reasoner", None),
    (r"deepseek-r1", None),
    (r"llama.*reasoning", None),
    (r"llama.*405b", None),
    (r"sonar.*reasoning", None),
    (r"sonar.*deep.?research", None),
    (r"grok.*reasoning", None),
    (r"grok-4", None),
];

impl Default for ReasoningPolicy {
    fn default() -> Self {
        let rules = DEFAULT_REASONING_PATTERNS
            .iter()
            .filter_map(|(pattern, unless)| {
                let pattern = Regex::new(pattern).ok()?;
                let unless = match unless {
                    Some(u) => Some(Regex::new(u).ok()?),
                    None => None,
                };
                Some(ReasoningRule {
                    pattern,
                    unless,
                    tier: ModelTier::Reasoning,
                })
            })
            .collect();
        Self { rules }
    }
}

impl ReasoningPolicy {
    pub fn new(rules: Vec<ReasoningRule>) -> Self {
        Self { rules }
    }

    /// Compile `(pattern, tier)` pairs; fails on the first bad pattern.
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = (&'a str, ModelTier)>,
    ) -> Result<Self, regex::Error> {
        let rules = patterns
            .into_iter()
            .map(|(p, tier)| {
                Ok(ReasoningRule {
                    pattern: Regex::new(p)?,
                    unless: None,
                    tier,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Classify by lowercase `id + " " + display_name`.
    pub fn classify(&self, model: &ModelInfo) -> ModelTier {
        let haystack = format!(
            "{} {}",
            model.id.to_lowercase(),
            model.display_name.as_deref().unwrap_or_default().to_lowercase()
        );
        self.rules
            .iter()
            .find(|rule| {
                rule.pattern.is_match(&haystack)
                    && !rule.unless.as_ref().is_some_and(|u| u.is_match(&haystack))
            })
            .map_or(ModelTier::Standard, |rule| rule.tier)
    }
}

// ── Menus ────────────────────────────────────────────────────────────

/// Group a live listing reasoning-first.
///
/// Blank ids are dropped. The requested selection is kept if listed,
/// otherwise the first displayed entry is preselected.
pub fn live_menu(models: &[ModelInfo], selected: Option<&str>, policy: &ReasoningPolicy) -> ModelMenu {
    let mut reasoning = Vec::new();
    let mut standard = Vec::new();

    for model in models.iter().filter(|m| !m.id.trim().is_empty()) {
        let option = ModelOption {
            id: model.id.clone(),
            label: model.label().to_owned(),
        };
        match policy.classify(model) {
            ModelTier::Reasoning => reasoning.push(option),
            ModelTier::Standard => standard.push(option),
        }
    }

    let mut groups = Vec::new();
    if !reasoning.is_empty() {
        groups.push(ModelGroup {
            tier: ModelTier::Reasoning,
            options: reasoning,
        });
    }
    if !standard.is_empty() {
        groups.push(ModelGroup {
            tier: ModelTier::Standard,
            options: standard,
        });
    }

    finish_menu(groups, selected)
}

/// Group a provider's static presets standard-first.
///
/// The selection falls back to the first standard, then first reasoning preset.
pub fn static_menu(entry: &ProviderCatalogEntry, selected: Option<&str>) -> ModelMenu {
    let to_options = |ids: &[String]| {
        ids.iter()
            .map(|id| ModelOption {
                id: id.clone(),
                label: id.clone(),
            })
            .collect::<Vec<_>>()
    };

    let mut groups = Vec::new();
    if !entry.models.standard.is_empty() {
        groups.push(ModelGroup {
            tier: ModelTier::Standard,
            options: to_options(&entry.models.standard),
        });
    }
    if !entry.models.reasoning.is_empty() {
        groups.push(ModelGroup {
            tier: ModelTier::Reasoning,
            options: to_options(&entry.models.reasoning),
        });
    }

    finish_menu(groups, selected)
}

fn finish_menu(groups: Vec<ModelGroup>, selected: Option<&str>) -> ModelMenu {
    let mut menu = ModelMenu {
        groups,
        selected: None,
    };
    menu.selected = match selected.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) if menu.contains(id) => Some(id.to_owned()),
        _ => menu.options().next().map(|o| o.id.clone()),
    };
    menu
}

/// Model substituted when a credential exists but no model was picked.
pub fn placeholder_model(entry: Option<&ProviderCatalogEntry>, fallback: &str) -> String {
    entry
        .and_then(ProviderCatalogEntry::first_preset)
        .unwrap_or(fallback)
        .to_owned()
}

// ── Model list state ─────────────────────────────────────────────────

/// What the model picker should show for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoices {
    /// Provider takes a typed model name.
    FreeText { current: String },
    /// No credential yet; the list stays disabled.
    NeedsCredential,
    /// A live listing should be fetched.
    Loading,
    Static(ModelMenu),
}

impl ModelChoices {
    pub fn menu(&self) -> Option<&ModelMenu> {
        match self {
            Self::Static(menu) => Some(menu),
            _ => None,
        }
    }
}

/// Result of a live model fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelFetch {
    Ready(ModelMenu),
    /// The selected provider changed while the request was in flight.
    Stale,
}

/// Tracks which provider the model picker currently belongs to.
///
/// A fetch captures the provider id when issued and is only applied if
/// that id is still current when the response arrives.
#[derive(Debug, Default)]
pub struct RelevanceGuard {
    current: Mutex<String>,
}

impl RelevanceGuard {
    pub fn set(&self, provider_id: &str) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = provider_id.trim().to_owned();
    }

    pub fn is_current(&self, provider_id: &str) -> bool {
        let current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        current.eq_ignore_ascii_case(provider_id.trim())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ModelTiers;

    fn info(id: &str, name: Option<&str>) -> ModelInfo {
        ModelInfo {
            id: id.into(),
            display_name: name.map(Into::into),
        }
    }

    fn entry(standard: &[&str], reasoning: &[&str]) -> ProviderCatalogEntry {
        ProviderCatalogEntry {
            id: "anthropic".into(),
            name: "Anthropic".into(),
            default_base_url: "https://api.anthropic.com".into(),
            models: ModelTiers {
                standard: standard.iter().map(|s| (*s).to_owned()).collect(),
                reasoning: reasoning.iter().map(|s| (*s).to_owned()).collect(),
            },
        }
    }

    #[test]
    fn default_policy_classifies_known_families() {
        let policy = ReasoningPolicy::default();
        for id in [
            "o1",
            "o3-mini",
            "gpt-5",
            "deepseek-reasoner",
            "deepseek-r1:14b",
            "gemini-1.5-pro",
            "claude-3-7-sonnet-20250219",
            "grok-4",
            "llama-3.1-405b",
        ] {
            assert_eq!(policy.classify(&info(id, None)), ModelTier::Reasoning, "{id}");
        }
        for id in ["gpt-4o", "gemini-1.5-flash-pro", "claude-3-haiku", "llama3"] {
            assert_eq!(policy.classify(&info(id, None)), ModelTier::Standard, "{id}");
        }
    }

    #[test]
    fn display_name_participates_in_classification() {
        let policy = ReasoningPolicy::default();
        assert_eq!(
            policy.classify(&info("model-x", Some("Deep Thinking Edition"))),
            ModelTier::Reasoning
        );
    }

    #[test]
    fn custom_rule_table_is_honored() {
        let policy = ReasoningPolicy::from_patterns([("^big-", ModelTier::Reasoning)]).unwrap();
        assert_eq!(policy.classify(&info("big-1", None)), ModelTier::Reasoning);
        assert_eq!(policy.classify(&info("o1", None)), ModelTier::Standard);
    }

    #[test]
    fn live_menu_is_reasoning_first_and_keeps_selection() {
        let models = vec![
            info("gpt-4o", None),
            info("o1", Some("O1")),
            info("  ", None),
            info("gpt-4o-mini", None),
        ];
        let menu = live_menu(&models, Some("gpt-4o-mini"), &ReasoningPolicy::default());

        assert_eq!(menu.groups.len(), 2);
        assert_eq!(menu.groups[0].tier, ModelTier::Reasoning);
        assert_eq!(menu.groups[0].options[0].label, "O1");
        assert_eq!(menu.selected.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn live_menu_falls_back_to_first_displayed() {
        let models = vec![info("gpt-4o", None), info("o3", None)];
        let menu = live_menu(&models, Some("gone"), &ReasoningPolicy::default());
        assert_eq!(menu.selected.as_deref(), Some("o3"));
    }

    #[test]
    fn static_menu_selection_is_always_a_preset() {
        let cases = [
            (entry(&["a", "b"], &["r"]), Some("b"), "b"),
            (entry(&["a", "b"], &["r"]), Some("nope"), "a"),
            (entry(&[], &["r1", "r2"]), None, "r1"),
        ];
        for (entry, requested, expected) in cases {
            let menu = static_menu(&entry, requested);
            let selected = menu.selected.clone().unwrap();
            assert_eq!(selected, expected);
            assert!(entry.has_preset(&selected));
        }
    }

    #[test]
    fn placeholder_prefers_standard_then_reasoning_then_fallback() {
        assert_eq!(placeholder_model(Some(&entry(&["s"], &["r"])), "gpt-4o"), "s");
        assert_eq!(placeholder_model(Some(&entry(&[], &["r"])), "gpt-4o"), "r");
        assert_eq!(placeholder_model(Some(&entry(&[], &[])), "gpt-4o"), "gpt-4o");
        assert_eq!(placeholder_model(None, "gpt-4o"), "gpt-4o");
    }

    #[test]
    fn relevance_guard_tracks_latest_provider() {
        let guard = RelevanceGuard::default();
        guard.set("openai");
        assert!(guard.is_current("openai"));
        guard.set("anthropic");
        assert!(!guard.is_current("openai"));
    }

    #[test]
    fn relevance_guard_ignores_id_case() {
        let guard = RelevanceGuard::default();
        guard.set("OpenAI");
        assert!(guard.is_current(" openai "));
    }
}
