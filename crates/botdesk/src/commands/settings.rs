//! Combined settings overview.

use std::sync::Arc;

use serde::Serialize;

use botdesk_core::{ConnectorSettings, IntegrationKind, ProviderSettings, StatusReport};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util;

#[derive(Serialize)]
struct Overview {
    connector: Arc<ConnectorSettings>,
    connector_status: StatusReport,
    provider: Arc<ProviderSettings>,
    provider_status: StatusReport,
}

fn detail(o: &Overview, color: bool) -> String {
    [
        "Bot".to_owned(),
        format!(
            "  Token:    {}",
            util::or_dash(o.connector.credential_masked.as_deref())
        ),
        format!("  Active:   {}", util::yes_no(o.connector.is_active)),
        format!(
            "  Status:   {}",
            output::paint_status(o.connector_status.status, &o.connector_status.text, color)
        ),
        String::new(),
        "Assistant".to_owned(),
        format!(
            "  Provider: {}",
            util::or_dash(o.provider.provider_type.as_deref())
        ),
        format!("  Model:    {}", util::or_dash(Some(&o.provider.model))),
        format!(
            "  API key:  {}",
            util::or_dash(o.provider.credential_masked.as_deref())
        ),
        format!("  Active:   {}", util::yes_no(o.provider.is_active)),
        format!(
            "  Status:   {}",
            output::paint_status(o.provider_status.status, &o.provider_status.text, color)
        ),
    ]
    .join("\n")
}

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let overview = Overview {
        connector: util::loaded(session.connector_snapshot(), IntegrationKind::Connector)?,
        connector_status: session.connector_status(),
        provider: util::loaded(session.provider_snapshot(), IntegrationKind::Provider)?,
        provider_status: session.provider_status(),
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &overview,
        |o| detail(o, color),
        |o| {
            format!(
                "{}\n{}",
                o.connector_status.status.display_text(),
                o.provider_status.status.display_text()
            )
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
