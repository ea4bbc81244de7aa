use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Financial metrics for which growth/valuation slopes are tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    FreeCashFlow,
    NetIncome,
    PriceToEarnings,
    CurrentRatio,
    ReturnOnEquity,
    ReturnOnAssets,
    NetProfitMargin,
    DebtToEquity,
    PriceToBook,
    PriceToSales,
    AssetTurnover,
}

/// Short-horizon (4-period lag) and long-horizon (20-period lag) slopes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlopePair {
    pub short: Option<f64>,
    pub long: Option<f64>,
}

/// Per-instrument slope table supplied by the fundamentals collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSlopes {
    #[serde(default)]
    pub slopes: BTreeMap<Metric, SlopePair>,
    #[serde(default)]
    pub fcf_yield: Option<f64>,
}

impl FundamentalSlopes {
    pub fn get(&self, metric: Metric) -> SlopePair {
        self.slopes.get(&metric).copied().unwrap_or_default()
    }

    pub fn short(&self, metric: Metric) -> Option<f64> {
        self.get(metric).short
    }

    pub fn long(&self, metric: Metric) -> Option<f64> {
        self.get(metric).long
    }

    pub fn with(mut self, metric: Metric, short: Option<f64>, long: Option<f64>) -> Self {
        self.slopes.insert(metric, SlopePair { short, long });
        self
    }
}

/// One quarter of reported financials. Missing fields read as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyStatement {
    pub filing_date: String,
    pub revenue: f64,
    pub net_income: f64,
    pub eps: f64,
    pub operating_cash_flow: f64,
    /// Usually negative (capital expenditure).
    pub investing_cash_flow: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub equity: f64,
    pub current_assets: f64,
    pub current_liabilities: f64,
    pub total_debt: f64,
}

impl QuarterlyStatement {
    pub fn free_cash_flow(&self) -> f64 {
        self.operating_cash_flow + self.investing_cash_flow
    }
}
