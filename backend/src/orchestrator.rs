//! Drives the registry: sequential backfill, then the ingestion and snapshot
//! loops until shutdown.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{TraceId, child_span, root_span, warn_if_slow};
use corelib::models::{Bar, PairKey, Snapshot};
use engine::{PairState, SnapshotContext, build_snapshot};
use market::{BarSource, PriceFeed, ReferenceSource};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::metrics::counters::Counters;
use crate::registry::{PairHandle, SnapshotStore, StreamRegistry};
use crate::summary::SnapshotSummary;

/// Publishes between periodic `info` summaries.
const SUMMARY_EVERY: u64 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub loaded: usize,
    pub skipped: usize,
    pub pairs: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub prices_applied: u64,
    pub bits_emitted: u64,
    pub failures: u64,
}

pub struct Orchestrator {
    cfg: Arc<AppConfig>,
    registry: Arc<StreamRegistry>,
    store: SnapshotStore,
    feed: Arc<dyn PriceFeed>,
    bars: Arc<dyn BarSource>,
    reference: Arc<dyn ReferenceSource>,
    counters: Counters,
}

impl Orchestrator {
    pub fn new(
        cfg: Arc<AppConfig>,
        feed: Arc<dyn PriceFeed>,
        bars: Arc<dyn BarSource>,
        reference: Arc<dyn ReferenceSource>,
    ) -> Self {
        Self {
            cfg,
            registry: Arc::new(StreamRegistry::new()),
            store: SnapshotStore::new(),
            feed,
            bars,
            reference,
            counters: Counters::default(),
        }
    }

    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    // =========================
    // Backfill
    // =========================

    /// Fetches history for every configured instrument in order, seeds one
    /// pair per threshold from the first close and replays the rest.
    ///
    /// Failed or empty fetches skip the instrument. A shutdown stops the walk;
    /// a fetch already in flight finishes and its bars are dropped. The
    /// completion flag is set in every case so the loops can proceed.
    #[instrument(skip_all, fields(instruments = self.cfg.symbols.len()))]
    pub async fn backfill(&self, shutdown: &watch::Receiver<bool>) -> BackfillReport {
        let symbols = &self.cfg.symbols;
        let progress = self.registry.progress();
        let mut report = BackfillReport::default();

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !self.cfg.backfill_delay.is_zero() {
                let mut rx = shutdown.clone();
                // A dropped sender disables the second branch, so the pause still applies.
                tokio::select! {
                    _ = tokio::time::sleep(self.cfg.backfill_delay) => {}
                    Ok(()) = rx.changed() => {}
                }
            }
            if *shutdown.borrow() {
                info!(done = i, "backfill interrupted");
                break;
            }

            let span = child_span("fetch_bars");
            span.record("symbol", symbol.as_str());
            let fetched = self
                .bars
                .fetch_bars(symbol, self.cfg.history_days)
                .instrument(span)
                .await;
            if *shutdown.borrow() {
                info!(done = i, "backfill interrupted");
                break;
            }

            match fetched {
                Ok(bars) if !bars.is_empty() => match self.seed_symbol(symbol, &bars) {
                    Some(pairs) => {
                        report.loaded += 1;
                        report.pairs += pairs;
                        Counters::bump(&self.counters.backfill_loaded, 1);
                        debug!(symbol = %symbol, bars = bars.len(), pairs, "instrument backfilled");
                    }
                    None => {
                        report.skipped += 1;
                        Counters::bump(&self.counters.backfill_skipped, 1);
                    }
                },
                Ok(_) => {
                    report.skipped += 1;
                    Counters::bump(&self.counters.backfill_skipped, 1);
                    debug!(symbol = %symbol, "no history, skipped");
                }
                Err(e) => {
                    report.skipped += 1;
                    Counters::bump(&self.counters.backfill_skipped, 1);
                    warn!(symbol = %symbol, error = %e, "history fetch failed, skipped");
                }
            }

            progress.set(i + 1, symbols.len());
        }

        progress.mark_complete();
        info!(
            loaded = report.loaded,
            skipped = report.skipped,
            pairs = report.pairs,
            "backfill complete"
        );
        report
    }

    /// Builds and registers one pair per threshold. `None` when replay
    /// panicked; nothing is registered for the instrument then.
    fn seed_symbol(&self, symbol: &str, bars: &[Bar]) -> Option<usize> {
        let (first, rest) = bars.split_first()?;
        let volume = self
            .reference
            .volume(symbol)
            .unwrap_or(self.cfg.default_volume);

        let seeded = catch_unwind(AssertUnwindSafe(|| {
            self.cfg
                .thresholds
                .iter()
                .map(|t| {
                    let mut state = PairState::with_capacity(
                        symbol,
                        t.value(),
                        first.close,
                        volume,
                        first.timestamp,
                        self.cfg.bit_capacity,
                    );
                    state.replay(rest);
                    (PairKey::new(symbol, *t), state)
                })
                .collect::<Vec<_>>()
        }));

        match seeded {
            Ok(states) => {
                let mut registered = 0;
                for (key, state) in states {
                    if self.registry.insert(key, state) {
                        registered += 1;
                    }
                }
                Some(registered)
            }
            Err(_) => {
                Counters::bump(&self.counters.pair_failures, 1);
                error!(symbol = %symbol, "replay panicked, instrument skipped");
                None
            }
        }
    }

    // =========================
    // Ingestion
    // =========================

    /// One ingestion cycle: every pair whose instrument has a live price
    /// gets that price. Does nothing until backfill has completed.
    pub fn ingest_tick(&self, now: DateTime<Utc>) -> IngestStats {
        let mut stats = IngestStats::default();
        if !self.registry.progress().is_complete() {
            return stats;
        }

        let prices = self.feed.get_all_prices();
        Counters::bump(&self.counters.ingest_ticks, 1);
        if prices.is_empty() {
            return stats;
        }

        for (key, handle) in self.registry.handles() {
            let Some(&price) = prices.get(&key.symbol) else {
                continue;
            };

            let outcome = catch_unwind(AssertUnwindSafe(|| handle.lock().process_price(price, now)));
            match outcome {
                Ok(emission) => {
                    stats.prices_applied += 1;
                    stats.bits_emitted = stats.bits_emitted.saturating_add(emission.len());
                }
                Err(_) => {
                    stats.failures += 1;
                    error!(pair = %key, price, "price processing panicked");
                }
            }
        }

        Counters::bump(&self.counters.prices_applied, stats.prices_applied);
        Counters::bump(&self.counters.bits_emitted, stats.bits_emitted);
        Counters::bump(&self.counters.pair_failures, stats.failures);
        stats
    }

    // =========================
    // Snapshots
    // =========================

    /// Snapshot for a single pair. Unknown keys are an error.
    pub fn snapshot(&self, key: &PairKey, now: DateTime<Utc>) -> Result<Snapshot, AppError> {
        let handle = self
            .registry
            .get(key)
            .ok_or_else(|| AppError::UnknownPair(key.clone()))?;
        let live = self.feed.get_all_prices().get(&key.symbol).copied();
        Ok(self.snapshot_pair(key, &handle, live, now))
    }

    /// Reference lookups happen before the pair lock is taken.
    fn snapshot_pair(
        &self,
        key: &PairKey,
        handle: &PairHandle,
        live_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> Snapshot {
        let range = self.reference.range(&key.symbol);
        let slopes = self.reference.slopes(&key.symbol);

        let ctx = SnapshotContext {
            live_price,
            range,
            slopes: slopes.as_deref(),
            min_tradable_stasis: self.cfg.min_tradable_stasis,
            recent_bits: self.cfg.recent_bits,
            now,
        };

        let state = handle.lock();
        build_snapshot(&state, &ctx)
    }

    /// Builds a fresh snapshot of every pair and swaps the published
    /// collection. Does nothing until backfill has completed.
    pub fn publish_snapshots(&self, now: DateTime<Utc>) -> Option<Arc<Vec<Snapshot>>> {
        if !self.registry.progress().is_complete() {
            return None;
        }

        let prices: HashMap<String, f64> = self.feed.get_all_prices();
        let handles = self.registry.handles();
        let mut snapshots = Vec::with_capacity(handles.len());

        for (key, handle) in &handles {
            let live = prices.get(&key.symbol).copied();
            match catch_unwind(AssertUnwindSafe(|| self.snapshot_pair(key, handle, live, now))) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(_) => {
                    Counters::bump(&self.counters.pair_failures, 1);
                    error!(pair = %key, "snapshot build panicked");
                }
            }
        }

        let published = self.store.publish(snapshots, now);
        let publishes = self.counters.snapshot_publishes.fetch_add(1, Ordering::Relaxed) + 1;

        let summary = SnapshotSummary::of(&published);
        debug!(?summary, "snapshots published");
        if publishes % SUMMARY_EVERY == 1 {
            let status = self.feed.get_status();
            info!(
                pairs = summary.pairs,
                tradable = summary.tradable,
                long = summary.long,
                short = summary.short,
                max_combined = summary.max_combined,
                connected = status.connected_count,
                messages = status.message_count,
                "stasis summary"
            );
        }

        Some(published)
    }

    // =========================
    // Loops
    // =========================

    /// Fixed-cadence ingestion until `shutdown` flips or its sender drops.
    pub async fn run_ingestion(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        let period = self.cfg.ingest_interval;
        let span = root_span("ingestion_loop", &TraceId::new());
        self.run_loop(period, shutdown, "ingest_tick", |o| {
            let stats = o.ingest_tick(Utc::now());
            if stats.bits_emitted > 0 {
                debug!(
                    applied = stats.prices_applied,
                    bits = stats.bits_emitted,
                    "ingestion cycle"
                );
            }
        })
        .instrument(span)
        .await
    }

    /// Fixed-cadence snapshot publishing until shutdown.
    pub async fn run_snapshots(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        let period = self.cfg.snapshot_interval;
        let span = root_span("snapshot_loop", &TraceId::new());
        self.run_loop(period, shutdown, "publish_snapshots", |o| {
            o.publish_snapshots(Utc::now());
        })
        .instrument(span)
        .await
    }

    async fn run_loop<F>(
        self: Arc<Self>,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
        label: &'static str,
        cycle: F,
    ) where
        F: Fn(&Self),
    {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(every_ms = period.as_millis() as u64, "loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            if !self.registry.progress().is_complete() {
                continue;
            }

            warn_if_slow(label, period, async { cycle(&*self) }).await;
        }

        info!("loop stopped");
    }
}
