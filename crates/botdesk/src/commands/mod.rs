//! Command dispatch: bridges CLI args -> session operations -> output formatting.

pub mod config_cmd;
pub mod connector;
pub mod provider;
pub mod settings;
pub mod tools;
pub mod util;
pub mod watch;

use botdesk_api::AdminClient;
use botdesk_core::AdminSession;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Session type every handler works against.
pub type Session = AdminSession<AdminClient>;

/// Dispatch a backend-bound command to the appropriate handler.
///
/// Notices raised while the command runs are printed to stderr afterwards.
/// On failure they are dropped; the error report says the same thing.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let mut notices = session.notices();

    let result = match cmd {
        // Tools have their own endpoints; no settings snapshot needed
        Command::Tools(args) => tools::handle(session, args, global).await,

        Command::Watch(args) => {
            session.open().await?;
            return watch::handle(session, notices, args, global).await;
        }

        cmd => match session.open().await {
            Err(e) => Err(e.into()),
            Ok(()) => match cmd {
                Command::Settings => settings::handle(session, global),
                Command::Connector(args) => connector::handle(session, args, global).await,
                Command::Provider(args) => provider::handle(session, args, global).await,
                // Handled above or before dispatch
                Command::Tools(_) | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
                    unreachable!()
                }
            },
        },
    };

    util::report_notices(&mut notices, global, result.is_ok());
    result
}
