//! Language-model provider command handlers.

use serde::Serialize;
use tabled::Tabled;

use botdesk_core::model::ModelTier;
use botdesk_core::{
    IntegrationKind, ModelChoices, ModelFetch, ModelMenu, ProviderCatalogEntry, ProviderSettings,
    StatusReport, UnbindOutcome,
};

use crate::cli::{GlobalOpts, ProviderArgs, ProviderCommand, ProviderSaveArgs};
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util;

const KIND: IntegrationKind = IntegrationKind::Provider;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Default URL")]
    url: String,
    #[tabled(rename = "Standard")]
    standard: usize,
    #[tabled(rename = "Reasoning")]
    reasoning: usize,
}

impl From<&ProviderCatalogEntry> for CatalogRow {
    fn from(e: &ProviderCatalogEntry) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            url: util::or_dash(Some(&e.default_base_url)).to_owned(),
            standard: e.models.standard.len(),
            reasoning: e.models.reasoning.len(),
        }
    }
}

/// One selectable model, flattened out of its tier group.
#[derive(Serialize)]
struct ModelEntry {
    id: String,
    label: String,
    tier: ModelTier,
    selected: bool,
}

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Model")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Tier")]
    tier: String,
}

impl From<&ModelEntry> for ModelRow {
    fn from(m: &ModelEntry) -> Self {
        Self {
            marker: if m.selected { "*" } else { "" },
            id: m.id.clone(),
            label: m.label.clone(),
            tier: m.tier.to_string(),
        }
    }
}

fn flatten(menu: &ModelMenu) -> Vec<ModelEntry> {
    menu.groups
        .iter()
        .flat_map(|group| {
            group.options.iter().map(|option| ModelEntry {
                id: option.id.clone(),
                label: option.label.clone(),
                tier: group.tier,
                selected: menu.selected.as_deref() == Some(option.id.as_str()),
            })
        })
        .collect()
}

fn detail(settings: &ProviderSettings, status: &StatusReport, color: bool) -> String {
    let mut lines = vec![
        format!(
            "Provider:       {}",
            util::or_dash(settings.provider_type.as_deref())
        ),
        format!("Model:          {}", util::or_dash(Some(&settings.model))),
        format!(
            "API key:        {}",
            util::or_dash(settings.credential_masked.as_deref())
        ),
        format!(
            "Running with:   {}",
            util::or_dash(settings.active_masked.as_deref())
        ),
        format!("Active:         {}", util::yes_no(settings.is_active)),
        format!("Endpoint:       {}", util::or_dash(Some(&settings.endpoint_url))),
    ];
    if let Some(ref project) = settings.project_id {
        lines.push(format!("Project:        {project}"));
    }
    if let Some(ref gateway) = settings.gateway_endpoint {
        lines.push(format!("Gateway:        {gateway}"));
        lines.push(format!(
            "API version:    {}",
            util::or_dash(settings.api_version.as_deref())
        ));
    }
    lines.push(format!(
        "System prompt:  {}",
        util::or_dash(settings.system_prompt.as_deref())
    ));
    lines.push(format!(
        "Status:         {}",
        output::paint_status(status.status, &status.text, color)
    ));
    lines.push(format!(
        "Last checked:   {}",
        util::timestamp(settings.last_checked.as_ref())
    ));
    lines.push(format!(
        "Last activated: {}",
        util::timestamp(settings.last_activated_at.as_ref())
    ));
    lines.join("\n")
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: ProviderArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProviderCommand::Show => {
            let settings = util::loaded(session.provider_snapshot(), KIND)?;
            let status = session.provider_status();
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &settings,
                |s| detail(s, &status, color),
                |s| s.provider_type.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProviderCommand::Catalog => {
            let catalog = session.provider_catalog().await?;
            let out = output::render_list(
                &global.output,
                catalog.as_slice(),
                |e| CatalogRow::from(e),
                |e| e.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProviderCommand::Models {
            provider,
            project_id,
        } => list_models(session, provider, project_id, global).await,

        ProviderCommand::Save(save) => save_provider(session, save, global).await,

        ProviderCommand::Test => {
            let report = session.test_provider().await;
            util::report_check(KIND, &report, global)
        }

        ProviderCommand::Activate => {
            let report = session.activate_provider().await?;
            if report.activated {
                Ok(())
            } else {
                Err(CliError::ActivationRefused {
                    integration: KIND,
                    message: report.message.unwrap_or_else(|| "no reason given".into()),
                })
            }
        }

        ProviderCommand::Clear => {
            if !util::confirm(
                "Delete all provider settings, including the API key?",
                "provider clear",
                global.yes,
            )? {
                return Ok(());
            }
            session.clear_provider().await?;
            Ok(())
        }

        ProviderCommand::Unbind => {
            if !global.yes {
                util::require_terminal("provider unbind")?;
            }
            let presenter = util::CliPresenter { yes: global.yes };
            match session.unbind_provider_key(&presenter).await? {
                UnbindOutcome::Unbound => Ok(()),
                UnbindOutcome::Cancelled => {
                    output::print_output("Cancelled", global.quiet);
                    Ok(())
                }
            }
        }
    }
}

async fn list_models(
    session: &Session,
    provider: Option<String>,
    project_id: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form = session.provider_form();
    let choices = match provider {
        Some(ref id) if !id.eq_ignore_ascii_case(&form.provider_type) => {
            session.select_provider(&mut form, id)
        }
        _ => session.model_choices(&form),
    };
    if let Some(project_id) = project_id {
        form.project_id = project_id;
    }

    let menu = match choices {
        ModelChoices::FreeText { current } => {
            output::print_output(
                &format!(
                    "{} takes any model name (current: {})",
                    form.provider_type,
                    util::or_dash(Some(&current))
                ),
                global.quiet,
            );
            return Ok(());
        }
        ModelChoices::NeedsCredential => {
            return Err(CliError::Validation {
                field: "provider".into(),
                reason: format!(
                    "save an API key for {} before listing its models",
                    form.provider_type
                ),
            });
        }
        ModelChoices::Loading => {
            let selected = Some(form.selected_model.as_str()).filter(|m| !m.is_empty());
            match session
                .fetch_live_models(&form.provider_type, selected, Some(form.project_id.as_str()))
                .await?
            {
                ModelFetch::Ready(menu) => menu,
                ModelFetch::Stale => return Ok(()),
            }
        }
        ModelChoices::Static(menu) => menu,
    };

    let entries = flatten(&menu);
    let out = output::render_list(
        &global.output,
        &entries,
        |m| ModelRow::from(m),
        |m| m.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn save_provider(session: &Session, args: ProviderSaveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut form = session.provider_form();

    if let Some(ref id) = args.provider {
        if !id.eq_ignore_ascii_case(&form.provider_type) {
            session.select_provider(&mut form, id);
        }
    }

    let api_key = if args.ask_key {
        Some(util::read_secret("API key: ")?)
    } else {
        args.api_key
    };
    if let Some(key) = api_key {
        form.credential.set_typed(key);
    }
    if let Some(endpoint) = args.endpoint {
        form.endpoint_url = endpoint;
    }
    if let Some(model) = args.model {
        form.set_model(model, &session.config().provider_policy);
    }
    if let Some(prompt) = args.system_prompt {
        form.system_prompt = prompt;
    }
    if let Some(project) = args.project_id {
        if !session.config().provider_policy.uses_project_id(&form.provider_type) {
            return Err(CliError::Validation {
                field: "project-id".into(),
                reason: format!("{} does not take a project id", form.provider_type),
            });
        }
        form.project_id = project;
    }
    if let Some(gateway) = args.gateway_endpoint {
        form.gateway_endpoint = gateway;
    }
    if let Some(version) = args.api_version {
        form.api_version = version;
    }

    let outcome = session.save_provider(&mut form).await?;
    util::report_save(KIND, &outcome, global)
}
