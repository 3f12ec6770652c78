// ── Connectivity poller ──
//
// Background interval task per integration. Each tick re-reads credential
// presence from shared state and skips silently when nothing is stored;
// otherwise it runs the backend's connectivity test and publishes the
// resulting status. Failures never stop the poller.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::CoreError;
use crate::model::{ConnectionStatus, ConnectivityReport, IntegrationKind};
use crate::notice::Notice;
use crate::stream::StatusStream;

/// What a poller tick needs from the outside world.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Re-evaluated on every tick.
    fn credential_present(&self) -> bool;

    async fn test(&self) -> Result<ConnectivityReport, CoreError>;
}

/// Status plus the line of text shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: ConnectionStatus,
    pub text: String,
}

impl StatusReport {
    pub fn from_status(status: ConnectionStatus) -> Self {
        Self {
            status,
            text: status.display_text().to_owned(),
        }
    }

    /// Map a test result; anything but success/not-configured is a failure.
    pub fn from_report(report: &ConnectivityReport) -> Self {
        let status = match report.status {
            ConnectionStatus::Success => ConnectionStatus::Success,
            ConnectionStatus::NotConfigured => return Self::from_status(ConnectionStatus::NotConfigured),
            ConnectionStatus::Checking | ConnectionStatus::Failed => ConnectionStatus::Failed,
        };
        let text = report
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| status.display_text().to_owned(), ToOwned::to_owned);
        Self { status, text }
    }

    fn failed(err: &CoreError) -> Self {
        let text = match err {
            CoreError::Api { message, .. } | CoreError::Rejected { message, .. } => message.clone(),
            _ => ConnectionStatus::Failed.display_text().to_owned(),
        };
        Self {
            status: ConnectionStatus::Failed,
            text,
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Interval-driven connectivity checker for one integration.
///
/// `Idle -> Polling -> Idle`; at most one task exists at a time.
pub struct ConnectivityPoller {
    kind: IntegrationKind,
    interval: Duration,
    probe: Arc<dyn ConnectivityProbe>,
    status: watch::Sender<StatusReport>,
    notices: broadcast::Sender<Notice>,
    task: Mutex<Option<PollTask>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl ConnectivityPoller {
    pub fn new(
        kind: IntegrationKind,
        interval: Duration,
        probe: Arc<dyn ConnectivityProbe>,
        notices: broadcast::Sender<Notice>,
    ) -> Self {
        let (status, _) = watch::channel(StatusReport::from_status(ConnectionStatus::NotConfigured));
        Self {
            kind,
            interval,
            probe,
            status,
            notices,
            task: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> IntegrationKind {
        self.kind
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start polling. No-op while a task is already running.
    pub fn start(self: &Arc<Self>) {
        let mut slot = lock(&self.task);
        if slot.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::downgrade(self),
            self.interval,
            cancel.clone(),
        ));
        *slot = Some(PollTask { cancel, handle });
        debug!(integration = %self.kind, interval = ?self.interval, "connectivity polling started");
    }

    /// Stop polling and clear the handle so a later `start()` works.
    pub fn stop(&self) {
        if let Some(task) = lock(&self.task).take() {
            task.cancel.cancel();
            debug!(integration = %self.kind, "connectivity polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    // ── Checks ───────────────────────────────────────────────────────

    /// Run the connectivity test now (manual retry), regardless of presence.
    pub async fn check_now(&self) -> StatusReport {
        self.publish(StatusReport::from_status(ConnectionStatus::Checking));

        let report = match self.probe.test().await {
            Ok(report) => StatusReport::from_report(&report),
            Err(e) => {
                warn!(integration = %self.kind, error = %e, "connectivity check failed");
                let _ = self
                    .notices
                    .send(Notice::error(e.to_string()).for_integration(self.kind));
                StatusReport::failed(&e)
            }
        };

        self.publish(report.clone());
        report
    }

    /// One scheduled tick: skipped without a test call when no credential is present.
    pub async fn tick(&self) -> Option<StatusReport> {
        if !self.probe.credential_present() {
            trace!(integration = %self.kind, "no credential, skipping connectivity check");
            return None;
        }
        Some(self.check_now().await)
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn status(&self) -> StatusReport {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> StatusStream {
        StatusStream::new(self.status.subscribe())
    }

    /// Publish a status learned elsewhere (snapshot load or save).
    pub fn publish(&self, report: StatusReport) {
        self.status.send_replace(report);
    }
}

impl Drop for ConnectivityPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(poller: Weak<ConnectivityPoller>, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(poller) = poller.upgrade() else { break };
                poller.tick().await;
            }
        }
    }
}
