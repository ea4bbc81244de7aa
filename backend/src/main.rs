use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use backend::{
    cli::Cli,
    config::AppConfig,
    metrics::counters::Counters,
    orchestrator::Orchestrator,
    reference::load_reference_book,
};
use clap::Parser;
use common::init_tracing;
use market::{JsonBarArchive, PriceBoard, pump_ticks};
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let result = runtime.block_on(run(Cli::parse()));

    // A blocking stdin read may still be parked; don't wait on it forever.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("loading configuration from environment")?;
    let cfg = cli.apply(cfg).context("applying command-line flags")?;

    init_tracing("stasis", cfg.json_logs);
    info!(
        symbols = cfg.symbols.len(),
        thresholds = cfg.thresholds.len(),
        data_dir = %cfg.data_dir.display(),
        "Starting stasis engine..."
    );

    let board = Arc::new(PriceBoard::new(cfg.symbols.clone()));
    let bars = Arc::new(JsonBarArchive::new(cfg.data_dir.join("bars")));
    let reference = Arc::new(
        load_reference_book(&cfg.data_dir.join("reference.json"), &cfg.symbols)
            .await
            .context("loading reference data")?,
    );

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(cfg),
        board.clone(),
        bars,
        reference,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ticks = tokio::spawn({
        let board = Arc::clone(&board);
        let rx = shutdown_rx.clone();
        async move {
            let stdin = BufReader::new(tokio::io::stdin());
            match pump_ticks(stdin, &board, rx).await {
                Ok(accepted) => info!(accepted, "tick reader finished"),
                Err(e) => error!(error = %e, "tick reader failed"),
            }
        }
    });

    let backfill = tokio::spawn({
        let o = Arc::clone(&orchestrator);
        let rx = shutdown_rx.clone();
        async move { o.backfill(&rx).await }
    });
    let ingestion = tokio::spawn(Arc::clone(&orchestrator).run_ingestion(shutdown_rx.clone()));
    let snapshots = tokio::spawn(Arc::clone(&orchestrator).run_snapshots(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    info!("Shutdown signal received");

    // Receivers may already be gone if every task ended on its own.
    let _ = shutdown_tx.send(true);

    ingestion.await.context("ingestion loop panicked")?;
    snapshots.await.context("snapshot loop panicked")?;
    let report = backfill.await.context("backfill panicked")?;
    ticks.abort();

    let c = orchestrator.counters();
    info!(
        loaded = report.loaded,
        skipped = report.skipped,
        ingest_ticks = Counters::get(&c.ingest_ticks),
        prices_applied = Counters::get(&c.prices_applied),
        bits_emitted = Counters::get(&c.bits_emitted),
        publishes = Counters::get(&c.snapshot_publishes),
        pair_failures = Counters::get(&c.pair_failures),
        "stasis engine stopped"
    );

    if cli.dump {
        let latest = orchestrator.store().latest();
        let out = serde_json::to_string_pretty(latest.as_slice())
            .context("serialising snapshots")?;
        println!("{out}");
    }

    Ok(())
}
