use std::sync::Arc;

use chrono::{DateTime, Utc};
use corelib::models::Snapshot;
use parking_lot::RwLock;

#[derive(Default)]
struct Published {
    snapshots: Arc<Vec<Snapshot>>,
    at: Option<DateTime<Utc>>,
}

/// Latest published snapshot collection.
///
/// Readers get the whole collection behind an `Arc`; a publish swaps it in
/// one step, so a reader never sees a half-built set.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Published>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshots: Vec<Snapshot>, at: DateTime<Utc>) -> Arc<Vec<Snapshot>> {
        let snapshots = Arc::new(snapshots);
        let mut g = self.inner.write();
        g.snapshots = Arc::clone(&snapshots);
        g.at = Some(at);
        snapshots
    }

    pub fn latest(&self) -> Arc<Vec<Snapshot>> {
        Arc::clone(&self.inner.read().snapshots)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().at
    }

    pub fn find(&self, symbol: &str, threshold: f64) -> Option<Snapshot> {
        self.latest()
            .iter()
            .find(|s| s.symbol == symbol && s.threshold == threshold)
            .cloned()
    }
}
