use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use corelib::models::{DailyBar, FundamentalSlopes, QuarterlyStatement, Week52Range};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MarketError;

/// Per-instrument reference lookups. Absence is normal and never an error.
pub trait ReferenceSource: Send + Sync {
    fn range(&self, symbol: &str) -> Option<Week52Range>;

    fn slopes(&self, symbol: &str) -> Option<Arc<FundamentalSlopes>>;

    /// Average daily volume in millions of shares.
    fn volume(&self, symbol: &str) -> Option<f64>;
}

/// Raw reference data for one instrument as stored in `reference.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRecord {
    /// Chronological daily bars, at most one year.
    pub daily: Vec<DailyBar>,
    /// Chronological quarterly statements.
    pub statements: Vec<QuarterlyStatement>,
    pub market_cap: Option<f64>,
}

impl ReferenceRecord {
    /// Reads `{"AAPL": {...}, ...}`. A missing file yields an empty map and
    /// a malformed instrument entry is skipped without affecting the rest.
    pub async fn load_all(path: &Path) -> Result<HashMap<String, ReferenceRecord>, MarketError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no reference file");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(MarketError::io(path, e)),
        };

        let raw: HashMap<String, serde_json::Value> = serde_json::from_slice(&raw)?;
        let mut records = HashMap::with_capacity(raw.len());
        for (symbol, value) in raw {
            match serde_json::from_value::<ReferenceRecord>(value) {
                Ok(record) => {
                    records.insert(symbol.to_ascii_uppercase(), record);
                }
                Err(error) => warn!(symbol = %symbol, %error, "reference record skipped"),
            }
        }
        Ok(records)
    }
}

/// Derived reference values for one instrument.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceEntry {
    pub range: Option<Week52Range>,
    pub slopes: Option<Arc<FundamentalSlopes>>,
    pub avg_volume: Option<f64>,
}

/// In-memory reference store, filled once at startup and replaceable per
/// instrument.
#[derive(Debug, Default)]
pub struct ReferenceBook {
    entries: RwLock<HashMap<String, ReferenceEntry>>,
}

impl ReferenceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, symbol: impl Into<String>, entry: ReferenceEntry) {
        self.entries.write().insert(symbol.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ReferenceSource for ReferenceBook {
    fn range(&self, symbol: &str) -> Option<Week52Range> {
        self.entries.read().get(symbol).and_then(|e| e.range)
    }

    fn slopes(&self, symbol: &str) -> Option<Arc<FundamentalSlopes>> {
        self.entries.read().get(symbol).and_then(|e| e.slopes.clone())
    }

    fn volume(&self, symbol: &str) -> Option<f64> {
        self.entries.read().get(symbol).and_then(|e| e.avg_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbol_has_nothing() {
        let book = ReferenceBook::new();
        assert_eq!(book.range("AAPL"), None);
        assert_eq!(book.slopes("AAPL"), None);
        assert_eq!(book.volume("AAPL"), None);
    }

    #[test]
    fn lookups_return_stored_values() {
        let book = ReferenceBook::new();
        book.insert(
            "AAPL",
            ReferenceEntry {
                range: Some(Week52Range { high: 200.0, low: 150.0 }),
                slopes: None,
                avg_volume: Some(55.3),
            },
        );

        assert_eq!(book.len(), 1);
        assert_eq!(book.range("AAPL").unwrap().high, 200.0);
        assert_eq!(book.volume("AAPL"), Some(55.3));
        assert!(book.slopes("AAPL").is_none());
    }

    #[test]
    fn record_fields_default_when_missing() {
        let record: ReferenceRecord = serde_json::from_str(r#"{"market_cap": 3.0e12}"#).unwrap();
        assert!(record.daily.is_empty());
        assert!(record.statements.is_empty());
        assert_eq!(record.market_cap, Some(3.0e12));
    }
}
