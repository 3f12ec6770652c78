//! Extension tool command handlers.

use serde::Serialize;
use tabled::Tabled;

use botdesk_core::model::option_text;
use botdesk_core::{FieldKind, FieldSpec, InputValue, ToolReport, ToolSummary, ToolSurface};

use crate::cli::{GlobalOpts, ToolsArgs, ToolsCommand};
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ToolRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Plugin")]
    plugin: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Setup")]
    setup: &'static str,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ToolSummary> for ToolRow {
    fn from(t: &ToolSummary) -> Self {
        Self {
            name: t.name.clone(),
            plugin: t.plugin_name.clone(),
            enabled: util::yes_no(t.enabled),
            setup: match (t.has_settings, t.needs_config) {
                (_, true) => "needed",
                (true, false) => "done",
                (false, false) => "-",
            },
            description: t.description.clone(),
        }
    }
}

/// A form field as currently filled. Secrets carry only their mask.
#[derive(Serialize)]
struct FieldView {
    key: String,
    label: String,
    kind: &'static str,
    required: bool,
    value: String,
    description: Option<String>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Required")]
    required: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&FieldView> for FieldRow {
    fn from(f: &FieldView) -> Self {
        Self {
            key: f.key.clone(),
            label: f.label.clone(),
            kind: f.kind,
            required: util::yes_no(f.required),
            value: f.value.clone(),
        }
    }
}

fn field_views(surface: &ToolSurface) -> Vec<FieldView> {
    surface
        .schema
        .schema
        .iter()
        .map(|spec| FieldView {
            key: spec.key.clone(),
            label: spec.label.clone(),
            kind: spec.kind.name(),
            required: spec.required,
            value: surface
                .form
                .display_value(&surface.schema.schema, &spec.key)
                .unwrap_or_default(),
            description: spec.description.clone(),
        })
        .collect()
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: ToolsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ToolsCommand::List => {
            let listing = session.list_tools().await?;
            let mut out = output::render_list(
                &global.output,
                &listing.tools,
                |t| ToolRow::from(t),
                |t| t.name.clone(),
            );
            if matches!(global.output, crate::cli::OutputFormat::Table) {
                out.push_str(&format!(
                    "\n{} of {} tools enabled",
                    listing.enabled_count, listing.total
                ));
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ToolsCommand::Show { name } => {
            let surface = session.open_tool(&name).await?;
            let views = field_views(&surface);
            let out = output::render_list(
                &global.output,
                &views,
                |f| FieldRow::from(f),
                |f| format!("{}={}", f.key, f.value),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ToolsCommand::Configure {
            name,
            set,
            interactive,
        } => {
            if set.is_empty() && !interactive {
                return Err(CliError::Validation {
                    field: "set".into(),
                    reason: "nothing to change; pass --set KEY=VALUE or --interactive".into(),
                });
            }

            let mut surface = session.open_tool(&name).await?;
            if interactive {
                util::require_terminal("tools configure --interactive")?;
                prompt_fields(&mut surface)?;
            }
            for pair in &set {
                apply_pair(&mut surface, pair)?;
            }

            let report = session.save_tool(&surface).await?;
            check_report(&name, report)
        }

        ToolsCommand::Test { name } => {
            let report = session.test_tool(&name).await?;
            check_report(&name, report)
        }

        ToolsCommand::Enable { name } => {
            session.enable_tool(&name).await?;
            Ok(())
        }

        ToolsCommand::Disable { name } => {
            session.disable_tool(&name).await?;
            Ok(())
        }
    }
}

fn check_report(name: &str, report: ToolReport) -> Result<(), CliError> {
    if report.success {
        Ok(())
    } else {
        Err(CliError::ToolFailed {
            name: name.into(),
            message: report.message.unwrap_or_else(|| "no reason given".into()),
        })
    }
}

/// Apply one `KEY=VALUE` argument to the form.
fn apply_pair(surface: &mut ToolSurface, pair: &str) -> Result<(), CliError> {
    let (key, value) = pair.split_once('=').ok_or_else(|| CliError::Validation {
        field: "set".into(),
        reason: format!("expected KEY=VALUE, got '{pair}'"),
    })?;
    surface
        .form
        .set_from_text(&surface.schema.schema, key.trim(), value)
        .map_err(|e| CliError::InvalidForm {
            summary: e.to_string(),
        })
}

// ── Interactive form ─────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_label(spec: &FieldSpec) -> String {
    let mut label = spec.label.clone();
    if spec.required {
        label.push_str(" *");
    }
    if let Some(ref hint) = spec.description {
        label.push_str(&format!(" ({hint})"));
    }
    label
}

/// Walk every field in schema order and prompt by kind.
fn prompt_fields(surface: &mut ToolSurface) -> Result<(), CliError> {
    let schema = surface.schema.schema.clone();
    for spec in &schema {
        let Some(field) = surface.form.get(&spec.key) else {
            continue;
        };
        let label = prompt_label(spec);

        match (&spec.kind, &field.value) {
            (FieldKind::Boolean, InputValue::Toggle(on)) => {
                let on = dialoguer::Confirm::new()
                    .with_prompt(label)
                    .default(*on)
                    .interact()
                    .map_err(prompt_err)?;
                surface.form.set_toggle(&spec.key, on);
            }
            (FieldKind::Select { options }, InputValue::Choice(current)) => {
                let items: Vec<String> = options.iter().map(option_text).collect();
                let picked = dialoguer::Select::new()
                    .with_prompt(label)
                    .items(&items)
                    .default(current.unwrap_or(0))
                    .interact_opt()
                    .map_err(prompt_err)?;
                if picked.is_some() {
                    surface.form.choose(&spec.key, picked);
                }
            }
            (FieldKind::Password, _) => {
                let hint = if field.has_stored_secret() {
                    format!("{label} [stored {}, blank keeps it]: ", field.placeholder)
                } else {
                    format!("{label}: ")
                };
                let secret = util::read_secret(&hint)?;
                if !secret.is_empty() {
                    surface.form.set_text(&spec.key, secret);
                }
            }
            _ => {
                let current = surface
                    .form
                    .display_value(&schema, &spec.key)
                    .unwrap_or_default();
                let text: String = dialoguer::Input::new()
                    .with_prompt(label)
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
                surface.form.set_text(&spec.key, text);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_column_reflects_config_state() {
        let tool = ToolSummary {
            name: "jira_search".into(),
            description: "Search issues".into(),
            plugin_id: "jira".into(),
            plugin_name: "Jira".into(),
            enabled: false,
            needs_config: true,
            has_settings: true,
        };
        let row = ToolRow::from(&tool);
        assert_eq!(row.setup, "needed");
        assert_eq!(row.enabled, "no");
    }
}
