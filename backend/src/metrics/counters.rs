use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub ingest_ticks: Arc<AtomicU64>,
    pub prices_applied: Arc<AtomicU64>,
    pub bits_emitted: Arc<AtomicU64>,

    pub snapshot_publishes: Arc<AtomicU64>,

    // panics caught while processing or snapshotting one pair
    pub pair_failures: Arc<AtomicU64>,

    pub backfill_loaded: Arc<AtomicU64>,
    pub backfill_skipped: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
