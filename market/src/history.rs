use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use corelib::models::Bar;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketError;

/// Historical intraday bars for backfill.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Chronological bars covering the last `lookback_days`. May be empty.
    async fn fetch_bars(&self, symbol: &str, lookback_days: u32) -> Result<Vec<Bar>, MarketError>;
}

/// On-disk bar archive: one `<SYMBOL>.json` per instrument holding
/// `[{"t": <epoch ms>, "c": <close>}, ...]`.
///
/// The lookback window is measured back from the newest bar in the file.
#[derive(Clone, Debug)]
pub struct JsonBarArchive {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct WireBar {
    t: i64,
    c: f64,
}

impl JsonBarArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.json"))
    }

    fn decode(path: &Path, raw: &[u8]) -> Result<Vec<Bar>, MarketError> {
        let wire: Vec<WireBar> = serde_json::from_slice(raw)?;
        wire.into_iter()
            .map(|b| {
                let timestamp = DateTime::<Utc>::from_timestamp_millis(b.t).ok_or_else(|| {
                    MarketError::Malformed(format!("{}: bad timestamp {}", path.display(), b.t))
                })?;
                Ok(Bar {
                    timestamp,
                    close: b.c,
                })
            })
            .collect()
    }
}

/// Sorts by time and keeps bars within `lookback_days` of the newest one.
pub(crate) fn window_bars(mut bars: Vec<Bar>, lookback_days: u32) -> Vec<Bar> {
    bars.retain(|b| b.close.is_finite());
    bars.sort_by_key(|b| b.timestamp);

    let Some(newest) = bars.last().map(|b| b.timestamp) else {
        return bars;
    };
    let cutoff = newest - Duration::days(i64::from(lookback_days));
    bars.retain(|b| b.timestamp >= cutoff);
    bars
}

#[async_trait]
impl BarSource for JsonBarArchive {
    async fn fetch_bars(&self, symbol: &str, lookback_days: u32) -> Result<Vec<Bar>, MarketError> {
        let path = self.path_for(symbol);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(symbol, path = %path.display(), "no bar archive");
                return Ok(Vec::new());
            }
            Err(e) => return Err(MarketError::io(path, e)),
        };

        let bars = Self::decode(&path, &raw)?;
        Ok(window_bars(bars, lookback_days))
    }
}
