//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::TryRecvError};

use botdesk_core::{
    ConfirmPresenter, ConfirmPrompt, ConfirmResponder, ConnectionStatus, IntegrationKind, Notice,
    NoticeLevel, SaveOutcome, StatusReport,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Prompts ──────────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    require_terminal(action)?;
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Refuse to prompt when stdin is not a terminal.
pub fn require_terminal(action: &str) -> Result<(), CliError> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        })
    }
}

/// Read a secret without echo.
pub fn read_secret(prompt: &str) -> Result<String, CliError> {
    Ok(rpassword::prompt_password(prompt)?)
}

/// Answers session confirmation prompts on the terminal.
///
/// `--yes` confirms without asking. Ctrl-C or Esc at the prompt dismisses.
pub struct CliPresenter {
    pub yes: bool,
}

impl ConfirmPresenter for CliPresenter {
    fn present(&self, prompt: &ConfirmPrompt, responder: ConfirmResponder) {
        if self.yes {
            responder.confirm();
            return;
        }
        eprintln!("{}", prompt.text);
        let answer = dialoguer::Confirm::new()
            .with_prompt(prompt.title.clone())
            .default(false)
            .interact_opt();
        match answer {
            Ok(Some(true)) => responder.confirm(),
            Ok(Some(false)) => responder.cancel(),
            Ok(None) | Err(_) => responder.dismiss(),
        };
    }
}

// ── Notices ──────────────────────────────────────────────────────────

/// Print buffered notices to stderr.
///
/// After a failed command nothing is printed. Quiet mode keeps only
/// warnings and errors.
pub fn report_notices(rx: &mut broadcast::Receiver<Notice>, global: &GlobalOpts, succeeded: bool) {
    let color = output::should_color(&global.color);
    loop {
        match rx.try_recv() {
            Ok(notice) => {
                if !succeeded || (global.quiet && notice.level == NoticeLevel::Success) {
                    continue;
                }
                eprintln!("{}", output::format_notice(&notice, color));
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "notices dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Print what a save changed. A stored-but-not-running save is an error.
pub fn report_save(
    integration: IntegrationKind,
    outcome: &SaveOutcome,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match outcome {
        SaveOutcome::NoChanges => Ok(()),
        SaveOutcome::Applied { changes } | SaveOutcome::Patched { changes } => {
            output::print_output(&format!("Changed: {changes}"), global.quiet);
            Ok(())
        }
        SaveOutcome::SavedNotApplied { .. } => Err(CliError::NotApplied { integration }),
    }
}

/// Print a connectivity result; a failed check is an error.
pub fn report_check(
    integration: IntegrationKind,
    report: &StatusReport,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        report,
        |r| format!("Status: {}", output::paint_status(r.status, &r.text, color)),
        |r| r.text.clone(),
    );
    output::print_output(&out, global.quiet);

    if report.status == ConnectionStatus::Failed {
        return Err(CliError::CheckFailed {
            integration,
            message: report.text.clone(),
        });
    }
    Ok(())
}

// ── Formatting ───────────────────────────────────────────────────────

/// Snapshot loaded by `open()`, or an error if it is missing.
pub fn loaded<T>(snapshot: Option<Arc<T>>, integration: IntegrationKind) -> Result<Arc<T>, CliError> {
    snapshot.ok_or_else(|| CliError::ApiError {
        code: "snapshot".into(),
        message: format!("{integration} settings were not loaded"),
    })
}

pub fn timestamp(ts: Option<&DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
