//! Shared state of the running engine: the pair map, backfill progress and
//! the published snapshot collection.

mod progress;
mod snapshot_store;

use std::collections::BTreeMap;
use std::sync::Arc;

use corelib::models::PairKey;
use engine::PairState;
use parking_lot::{Mutex, RwLock};

pub use progress::BackfillProgress;
pub use snapshot_store::SnapshotStore;

/// Exclusive handle to one pair's encoder state.
pub type PairHandle = Arc<Mutex<PairState>>;

/// Map of every live bitstream keyed by (symbol, threshold).
///
/// The map lock is only held to insert or to clone handles out; callers lock
/// individual pairs after it has been released.
#[derive(Default)]
pub struct StreamRegistry {
    pairs: RwLock<BTreeMap<PairKey, PairHandle>>,
    progress: BackfillProgress,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pair; an existing pair under the same key is kept and
    /// `false` returned.
    pub fn insert(&self, key: PairKey, state: PairState) -> bool {
        let mut pairs = self.pairs.write();
        if pairs.contains_key(&key) {
            return false;
        }
        pairs.insert(key, Arc::new(Mutex::new(state)));
        true
    }

    pub fn get(&self, key: &PairKey) -> Option<PairHandle> {
        self.pairs.read().get(key).cloned()
    }

    /// Handles in key order (symbol, then threshold).
    pub fn handles(&self) -> Vec<(PairKey, PairHandle)> {
        self.pairs
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }

    pub fn progress(&self) -> &BackfillProgress {
        &self.progress
    }
}
