//! Derivation of fundamental slopes from quarterly statements, plus the
//! daily-bar reference figures (volume) the scorer and registry consume.

mod ratios;
mod slopes;

use corelib::models::{DailyBar, FundamentalSlopes, Metric, QuarterlyStatement};

pub use ratios::{RatioSeries, derive_ratios};
pub use slopes::{LONG_SPAN, SHORT_SPAN, ema, slope, slope_pair};

/// Fewer quarters than this and no slopes are produced at all.
pub const MIN_STATEMENTS: usize = 4;

/// Placeholder market cap when equity gives no usable estimate.
pub const FALLBACK_MARKET_CAP: f64 = 1e9;

/// Number of most recent daily bars averaged for the volume estimate.
pub const VOLUME_LOOKBACK: usize = 30;

/// Rough market cap: twice the latest positive shareholders' equity.
pub fn estimate_market_cap(statements: &[QuarterlyStatement]) -> f64 {
    match statements.last() {
        Some(s) if s.equity > 0.0 => s.equity * 2.0,
        _ => FALLBACK_MARKET_CAP,
    }
}

/// Computes the full slope table from chronological (oldest first)
/// statements.
pub fn compute_slopes(
    statements: &[QuarterlyStatement],
    price: f64,
    market_cap: Option<f64>,
) -> Option<FundamentalSlopes> {
    if statements.len() < MIN_STATEMENTS {
        return None;
    }

    let market_cap = market_cap.unwrap_or_else(|| estimate_market_cap(statements));
    let ratios = derive_ratios(statements, price, market_cap);

    let raw = |f: fn(&QuarterlyStatement) -> f64| -> Vec<Option<f64>> {
        statements.iter().map(|s| Some(f(s))).collect()
    };

    let series: [(Metric, Vec<Option<f64>>); 12] = [
        (Metric::Revenue, raw(|s| s.revenue)),
        (Metric::FreeCashFlow, raw(QuarterlyStatement::free_cash_flow)),
        (Metric::NetIncome, raw(|s| s.net_income)),
        (Metric::PriceToEarnings, ratios.price_to_earnings),
        (Metric::CurrentRatio, ratios.current_ratio),
        (Metric::ReturnOnEquity, ratios.return_on_equity),
        (Metric::ReturnOnAssets, ratios.return_on_assets),
        (Metric::NetProfitMargin, ratios.net_profit_margin),
        (Metric::DebtToEquity, ratios.debt_to_equity),
        (Metric::PriceToBook, ratios.price_to_book),
        (Metric::PriceToSales, ratios.price_to_sales),
        (Metric::AssetTurnover, ratios.asset_turnover),
    ];

    Some(FundamentalSlopes {
        slopes: series
            .into_iter()
            .map(|(metric, values)| (metric, slope_pair(&values)))
            .collect(),
        fcf_yield: ratios.fcf_yield.last().copied().flatten(),
    })
}

/// Average daily volume over the most recent bars, in millions of shares.
pub fn average_volume_millions(daily: &[DailyBar]) -> Option<f64> {
    let recent = &daily[daily.len().saturating_sub(VOLUME_LOOKBACK)..];
    if recent.is_empty() {
        return None;
    }
    let total: f64 = recent.iter().map(|b| b.volume).sum();
    Some(total / recent.len() as f64 / 1_000_000.0)
}
