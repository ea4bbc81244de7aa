//! Turns raw `reference.json` records into the derived values the snapshot
//! builder reads.

use std::path::Path;
use std::sync::Arc;

use corelib::models::Week52Range;
use engine::fundamentals::{average_volume_millions, compute_slopes};
use market::{ReferenceBook, ReferenceEntry, ReferenceRecord};
use tracing::{debug, info, instrument};

use crate::error::AppError;

/// Derives range, volume and slopes for one instrument.
///
/// Ratios are priced at the latest daily close; with no daily bars there is
/// no price and no slopes.
pub fn derive_entry(record: &ReferenceRecord) -> ReferenceEntry {
    let last_close = record
        .daily
        .last()
        .map(|b| b.close)
        .filter(|c| c.is_finite() && *c > 0.0);

    let slopes = last_close
        .and_then(|price| compute_slopes(&record.statements, price, record.market_cap))
        .map(Arc::new);

    ReferenceEntry {
        range: Week52Range::from_daily(&record.daily),
        slopes,
        avg_volume: average_volume_millions(&record.daily),
    }
}

/// Loads `<data_dir>/reference.json` into a fresh book, keeping only
/// instruments in `symbols`.
#[instrument(skip_all, fields(path = %path.display(), symbols = symbols.len()))]
pub async fn load_reference_book(path: &Path, symbols: &[String]) -> Result<ReferenceBook, AppError> {
    let records = ReferenceRecord::load_all(path).await?;
    let book = ReferenceBook::new();

    for symbol in symbols {
        let Some(record) = records.get(symbol) else {
            continue;
        };
        let entry = derive_entry(record);
        debug!(
            symbol = %symbol,
            has_range = entry.range.is_some(),
            has_slopes = entry.slopes.is_some(),
            avg_volume = ?entry.avg_volume,
            "reference derived"
        );
        book.insert(symbol.clone(), entry);
    }

    info!(instruments = book.len(), "reference data loaded");
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::models::{DailyBar, QuarterlyStatement};

    fn daily(close: f64, volume: f64) -> DailyBar {
        DailyBar {
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    #[test]
    fn empty_record_derives_nothing() {
        let entry = derive_entry(&ReferenceRecord::default());
        assert_eq!(entry, ReferenceEntry::default());
    }

    #[test]
    fn daily_bars_give_range_and_volume() {
        let record = ReferenceRecord {
            daily: vec![daily(100.0, 2_000_000.0), daily(120.0, 4_000_000.0)],
            ..Default::default()
        };

        let entry = derive_entry(&record);

        assert_eq!(entry.range, Some(Week52Range { high: 121.0, low: 99.0 }));
        assert_eq!(entry.avg_volume, Some(3.0));
        assert!(entry.slopes.is_none());
    }

    #[test]
    fn statements_need_a_price() {
        let statements: Vec<QuarterlyStatement> = (0..6)
            .map(|i| QuarterlyStatement {
                revenue: 100.0 + i as f64 * 10.0,
                equity: 50.0,
                ..Default::default()
            })
            .collect();

        let unpriced = ReferenceRecord {
            statements: statements.clone(),
            ..Default::default()
        };
        assert!(derive_entry(&unpriced).slopes.is_none());

        let priced = ReferenceRecord {
            statements,
            daily: vec![daily(80.0, 1_000_000.0)],
            market_cap: None,
        };
        let slopes = derive_entry(&priced).slopes.expect("slopes");
        assert!(slopes.short(corelib::models::Metric::Revenue).unwrap() > 0.0);
    }
}
