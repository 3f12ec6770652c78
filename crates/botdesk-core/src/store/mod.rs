// ── Snapshot store ──
//
// Last server-reported settings per integration, swapped wholesale.

mod snapshot;

pub use snapshot::SnapshotStore;
