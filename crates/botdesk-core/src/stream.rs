// ── Status streams ──
//
// Subscription type for consuming connectivity status changes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::poller::StatusReport;

/// A subscription to one integration's connectivity status.
///
/// Offers point-in-time access plus change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct StatusStream {
    current: StatusReport,
    receiver: watch::Receiver<StatusReport>,
}

impl StatusStream {
    pub(crate) fn new(receiver: watch::Receiver<StatusReport>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Status captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &StatusReport {
        &self.current
    }

    /// Latest published status.
    pub fn latest(&self) -> StatusReport {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the poller is gone.
    pub async fn changed(&mut self) -> Option<StatusReport> {
        self.receiver.changed().await.ok()?;
        let report = self.receiver.borrow_and_update().clone();
        self.current = report.clone();
        Some(report)
    }

    /// Convert into a `Stream`; yields the current value first.
    pub fn into_stream(self) -> StatusWatchStream {
        StatusWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StatusWatchStream {
    inner: WatchStream<StatusReport>,
}

impl Stream for StatusWatchStream {
    type Item = StatusReport;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::model::ConnectionStatus;

    #[tokio::test]
    async fn changed_tracks_latest_publish() {
        let (tx, rx) = watch::channel(StatusReport::from_status(ConnectionStatus::NotConfigured));
        let mut stream = StatusStream::new(rx);
        assert_eq!(stream.current().status, ConnectionStatus::NotConfigured);

        tx.send(StatusReport::from_status(ConnectionStatus::Success)).unwrap();
        let next = stream.changed().await.unwrap();
        assert_eq!(next.status, ConnectionStatus::Success);
        assert_eq!(stream.current().status, ConnectionStatus::Success);

        drop(tx);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn stream_yields_current_first() {
        let (tx, rx) = watch::channel(StatusReport::from_status(ConnectionStatus::Checking));
        let mut stream = StatusStream::new(rx).into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.status, ConnectionStatus::Checking);

        tx.send(StatusReport::from_status(ConnectionStatus::Failed)).unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(second.status, ConnectionStatus::Failed);
    }
}
