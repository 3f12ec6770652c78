//! Messaging-bot connector command handlers.

use botdesk_core::{ConnectorSettings, IntegrationKind, StatusReport, UnbindOutcome};

use crate::cli::{ConnectorArgs, ConnectorCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util;

const KIND: IntegrationKind = IntegrationKind::Connector;

fn detail(settings: &ConnectorSettings, status: &StatusReport, color: bool) -> String {
    [
        format!(
            "Token:          {}",
            util::or_dash(settings.credential_masked.as_deref())
        ),
        format!(
            "Running with:   {}",
            util::or_dash(settings.active_masked.as_deref())
        ),
        format!("Active:         {}", util::yes_no(settings.is_active)),
        format!("Endpoint:       {}", util::or_dash(Some(&settings.endpoint_url))),
        format!(
            "Status:         {}",
            output::paint_status(status.status, &status.text, color)
        ),
        format!(
            "Last checked:   {}",
            util::timestamp(settings.last_checked.as_ref())
        ),
        format!(
            "Last activated: {}",
            util::timestamp(settings.last_activated_at.as_ref())
        ),
    ]
    .join("\n")
}

pub async fn handle(session: &Session, args: ConnectorArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConnectorCommand::Show => {
            let settings = util::loaded(session.connector_snapshot(), KIND)?;
            let status = session.connector_status();
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &settings,
                |s| detail(s, &status, color),
                |s| s.credential_masked.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectorCommand::Save {
            token,
            ask_token,
            endpoint,
        } => {
            let mut form = session.connector_form();
            let token = if ask_token {
                Some(util::read_secret("Bot token: ")?)
            } else {
                token
            };
            if let Some(token) = token {
                form.credential.set_typed(token);
            }
            if let Some(endpoint) = endpoint {
                form.endpoint_url = endpoint;
            }

            let outcome = session.save_connector(&mut form).await?;
            util::report_save(KIND, &outcome, global)
        }

        ConnectorCommand::Test => {
            let report = session.test_connector().await;
            util::report_check(KIND, &report, global)
        }

        ConnectorCommand::Activate => {
            let report = session.activate_connector().await?;
            if report.activated {
                Ok(())
            } else {
                Err(CliError::ActivationRefused {
                    integration: KIND,
                    message: report.message.unwrap_or_else(|| "no reason given".into()),
                })
            }
        }

        ConnectorCommand::Clear => {
            if !util::confirm(
                "Delete all connector settings, including the bot token?",
                "connector clear",
                global.yes,
            )? {
                return Ok(());
            }
            session.clear_connector().await?;
            Ok(())
        }

        ConnectorCommand::Unbind => {
            if !global.yes {
                util::require_terminal("connector unbind")?;
            }
            let presenter = util::CliPresenter { yes: global.yes };
            match session.unbind_connector_token(&presenter).await? {
                UnbindOutcome::Unbound => Ok(()),
                UnbindOutcome::Cancelled => {
                    output::print_output("Cancelled", global.quiet);
                    Ok(())
                }
            }
        }
    }
}
