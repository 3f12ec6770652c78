// ── Settings snapshot store ──
//
// Lock-free holder of the last connector/provider snapshot. Values are
// replaced, never mutated in place; each replacement bumps a revision
// observable through a `watch` channel.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{ConnectorSettings, ProviderSettings};

/// Diff baseline for both integrations.
pub struct SnapshotStore {
    connector: ArcSwapOption<ConnectorSettings>,
    provider: ArcSwapOption<ProviderSettings>,
    revision: watch::Sender<u64>,
    last_replaced: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        let (last_replaced, _) = watch::channel(None);
        Self {
            connector: ArcSwapOption::empty(),
            provider: ArcSwapOption::empty(),
            revision,
            last_replaced,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn connector(&self) -> Option<Arc<ConnectorSettings>> {
        self.connector.load_full()
    }

    pub fn provider(&self) -> Option<Arc<ProviderSettings>> {
        self.provider.load_full()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn last_replaced(&self) -> Option<DateTime<Utc>> {
        *self.last_replaced.borrow()
    }

    /// Revision counter; changes on every replacement or clear.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // ── Replacement ──────────────────────────────────────────────────

    pub fn replace_connector(&self, settings: ConnectorSettings) {
        self.connector.store(Some(Arc::new(settings)));
        self.bump();
    }

    pub fn replace_provider(&self, settings: ProviderSettings) {
        self.provider.store(Some(Arc::new(settings)));
        self.bump();
    }

    pub fn replace_all(&self, connector: ConnectorSettings, provider: ProviderSettings) {
        self.connector.store(Some(Arc::new(connector)));
        self.provider.store(Some(Arc::new(provider)));
        self.bump();
    }

    /// Drop both snapshots (surface teardown).
    pub fn clear(&self) {
        self.connector.store(None);
        self.provider.store(None);
        self.revision.send_modify(|r| *r += 1);
        self.last_replaced.send_replace(None);
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
        self.last_replaced.send_replace(Some(Utc::now()));
    }
}
