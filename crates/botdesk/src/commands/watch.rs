//! Follow connectivity status until interrupted.
//!
//! Prints the current status of both integrations, then one line per
//! change as the background pollers publish it. Notices are printed as
//! they arrive.

use tokio::sync::broadcast::{self, error::RecvError};

use botdesk_core::{IntegrationKind, Notice, StatusReport};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::Session;

fn line(kind: IntegrationKind, report: &StatusReport, color: bool) -> String {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    let kind = kind.to_string();
    format!(
        "{stamp}  {kind:<9}  {}",
        output::paint_status(report.status, &report.text, color)
    )
}

pub async fn handle(
    session: &Session,
    mut notices: broadcast::Receiver<Notice>,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut connector = session.subscribe_connector();
    let mut provider = session.subscribe_provider();

    output::print_output(
        &line(IntegrationKind::Connector, connector.current(), color),
        global.quiet,
    );
    output::print_output(
        &line(IntegrationKind::Provider, provider.current(), color),
        global.quiet,
    );

    for kind in [IntegrationKind::Connector, IntegrationKind::Provider] {
        if !session.is_polling(kind) {
            tracing::info!(integration = %kind, "no stored credential, not polling");
        }
    }

    let mut seen = 0usize;
    let mut connector_open = true;
    let mut provider_open = true;
    while args.count.is_none_or(|limit| seen < limit) && (connector_open || provider_open) {
        tokio::select! {
            changed = connector.changed(), if connector_open => match changed {
                Some(report) => {
                    seen += 1;
                    output::print_output(&line(IntegrationKind::Connector, &report, color), global.quiet);
                }
                None => connector_open = false,
            },
            changed = provider.changed(), if provider_open => match changed {
                Some(report) => {
                    seen += 1;
                    output::print_output(&line(IntegrationKind::Provider, &report, color), global.quiet);
                }
                None => provider_open = false,
            },
            notice = notices.recv() => match notice {
                Ok(notice) => eprintln!("{}", output::format_notice(&notice, color)),
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "notices dropped"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
