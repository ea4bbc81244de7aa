use corelib::models::{FundamentalSlopes, Metric, SlopeDetails};

use super::tiers::{at_least, at_most};

/// Highest reachable fundamental score with the current rule set.
pub const FUNDAMENTAL_MERIT_MAX: u32 = 48;

#[derive(Clone, Copy, Debug)]
enum Horizon {
    Short,
    Long,
}

/// Growth metrics score rising slopes; valuation metrics score falling ones
/// (cheaper, less leveraged).
#[derive(Clone, Copy, Debug)]
enum Scoring {
    Growth(&'static [(f64, u32)]),
    Valuation(&'static [(f64, u32)]),
}

struct SlopeRule {
    metric: Metric,
    horizon: Horizon,
    scoring: Scoring,
}

const fn growth(metric: Metric, horizon: Horizon, table: &'static [(f64, u32)]) -> SlopeRule {
    SlopeRule {
        metric,
        horizon,
        scoring: Scoring::Growth(table),
    }
}

const fn valuation(metric: Metric, horizon: Horizon, table: &'static [(f64, u32)]) -> SlopeRule {
    SlopeRule {
        metric,
        horizon,
        scoring: Scoring::Valuation(table),
    }
}

const RULES: &[SlopeRule] = &[
    growth(Metric::Revenue, Horizon::Short, &[(0.30, 4), (0.20, 3), (0.10, 2), (0.05, 1)]),
    growth(Metric::Revenue, Horizon::Long, &[(0.20, 3), (0.10, 2), (0.05, 1)]),
    growth(Metric::FreeCashFlow, Horizon::Short, &[(0.40, 4), (0.25, 3), (0.10, 2), (0.05, 1)]),
    growth(Metric::FreeCashFlow, Horizon::Long, &[(0.25, 3), (0.15, 2), (0.05, 1)]),
    growth(Metric::ReturnOnEquity, Horizon::Short, &[(0.20, 2), (0.10, 1)]),
    growth(Metric::ReturnOnEquity, Horizon::Long, &[(0.15, 2), (0.08, 1)]),
    growth(Metric::ReturnOnAssets, Horizon::Short, &[(0.15, 2), (0.08, 1)]),
    growth(Metric::NetProfitMargin, Horizon::Short, &[(0.20, 2), (0.10, 1)]),
    growth(Metric::NetProfitMargin, Horizon::Long, &[(0.15, 2), (0.08, 1)]),
    growth(Metric::AssetTurnover, Horizon::Short, &[(0.10, 1)]),
    growth(Metric::CurrentRatio, Horizon::Short, &[(0.10, 1)]),
    valuation(Metric::PriceToEarnings, Horizon::Short, &[(-0.25, 3), (-0.15, 2), (-0.05, 1)]),
    valuation(Metric::PriceToEarnings, Horizon::Long, &[(-0.20, 2), (-0.10, 1)]),
    valuation(Metric::DebtToEquity, Horizon::Short, &[(-0.20, 2), (-0.10, 1)]),
    valuation(Metric::DebtToEquity, Horizon::Long, &[(-0.15, 2), (-0.08, 1)]),
    valuation(Metric::PriceToBook, Horizon::Short, &[(-0.20, 1)]),
    valuation(Metric::PriceToSales, Horizon::Short, &[(-0.20, 1)]),
];

/// Lower in the 52-week range scores higher (buying near the low).
const PERCENTILE_TIERS: &[(f64, u32)] = &[
    (5.0, 8),
    (15.0, 7),
    (25.0, 6),
    (35.0, 5),
    (45.0, 4),
    (55.0, 3),
    (65.0, 2),
    (75.0, 1),
];

const FCF_YIELD_TIERS: &[(f64, u32)] = &[(0.15, 3), (0.10, 2), (0.05, 1)];

/// Slopes echoed into the snapshot for display.
const DETAIL_KEYS: &[(&str, Metric, Horizon)] = &[
    ("Rev_5", Metric::Revenue, Horizon::Short),
    ("Rev_20", Metric::Revenue, Horizon::Long),
    ("FCF_5", Metric::FreeCashFlow, Horizon::Short),
    ("FCF_20", Metric::FreeCashFlow, Horizon::Long),
    ("ROE_5", Metric::ReturnOnEquity, Horizon::Short),
    ("ROA_5", Metric::ReturnOnAssets, Horizon::Short),
    ("NPM_5", Metric::NetProfitMargin, Horizon::Short),
    ("PE_5", Metric::PriceToEarnings, Horizon::Short),
    ("DE_5", Metric::DebtToEquity, Horizon::Short),
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FundamentalMerit {
    pub score: u32,
    pub details: SlopeDetails,
}

fn slope(slopes: &FundamentalSlopes, metric: Metric, horizon: Horizon) -> Option<f64> {
    match horizon {
        Horizon::Short => slopes.short(metric),
        Horizon::Long => slopes.long(metric),
    }
}

/// Fundamental Merit Score from growth/valuation slopes, 52-week position
/// and free-cash-flow yield.
///
/// Without fundamentals only the 52-week component is scored and the detail
/// map stays empty.
pub fn fundamental_merit(
    slopes: Option<&FundamentalSlopes>,
    week52_percentile: Option<f64>,
) -> FundamentalMerit {
    let position = week52_percentile.map_or(0, |p| at_most(p, PERCENTILE_TIERS));

    let Some(slopes) = slopes else {
        return FundamentalMerit {
            score: position,
            details: SlopeDetails::new(),
        };
    };

    let rules: u32 = RULES
        .iter()
        .filter_map(|rule| {
            let value = slope(slopes, rule.metric, rule.horizon)?;
            Some(match rule.scoring {
                Scoring::Growth(table) => at_least(value, table),
                Scoring::Valuation(table) => at_most(value, table),
            })
        })
        .sum();

    let fcf_yield = slopes.fcf_yield.map_or(0, |y| at_least(y, FCF_YIELD_TIERS));

    let mut details: SlopeDetails = DETAIL_KEYS
        .iter()
        .map(|(key, metric, horizon)| (key.to_string(), slope(slopes, *metric, *horizon)))
        .collect();
    details.insert("FCFY".to_string(), slopes.fcf_yield);

    FundamentalMerit {
        score: rules + position + fcf_yield,
        details,
    }
}
