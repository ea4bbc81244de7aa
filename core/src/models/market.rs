use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Band threshold as a fraction of the anchor price (0.01 = 1%).
///
/// Equality and hashing use the exact bit pattern so a threshold can key a
/// map; construction through [`Threshold::new`] rejects non-finite and
/// non-positive values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(fraction: f64) -> Option<Self> {
        (fraction.is_finite() && fraction > 0.0).then_some(Self(fraction))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn pct(self) -> f64 {
        self.0 * 100.0
    }
}

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Threshold {}

impl Hash for Threshold {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Threshold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Threshold {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.pct())
    }
}

/// Identity of one bitstream: instrument plus band threshold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub symbol: String,
    pub threshold: Threshold,
}

impl PairKey {
    pub fn new(symbol: impl Into<String>, threshold: Threshold) -> Self {
        Self {
            symbol: symbol.into(),
            threshold,
        }
    }

    pub fn id(&self) -> String {
        format!("{}@{}", self.symbol, self.threshold)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.threshold)
    }
}

/// Intraday historical bar used for backfill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Daily bar used to derive the 52-week range and average volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Trailing one-year high/low.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Week52Range {
    pub high: f64,
    pub low: f64,
}

impl Week52Range {
    /// Max high and min low across the bars; `None` for an empty slice.
    pub fn from_daily(bars: &[DailyBar]) -> Option<Self> {
        let high = bars.iter().map(|b| b.high).reduce(f64::max)?;
        let low = bars.iter().map(|b| b.low).reduce(f64::min)?;
        Some(Self { high, low })
    }

    /// Position of `price` inside the range, clamped to `[0, 100]`.
    ///
    /// Undefined for a degenerate (zero or inverted) range.
    pub fn percentile(&self, price: f64) -> Option<f64> {
        let span = self.high - self.low;
        if !(span > 0.0) {
            return None;
        }
        Some(((price - self.low) / span * 100.0).clamp(0.0, 100.0))
    }
}

/// Connection summary reported by a price feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub total_instruments: usize,
    pub connected_count: usize,
    pub message_count: u64,
}
