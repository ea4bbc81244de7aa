use corelib::models::QuarterlyStatement;

/// Per-quarter financial ratios, aligned with the input statements.
/// `None` wherever the ratio has no meaningful denominator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatioSeries {
    pub price_to_earnings: Vec<Option<f64>>,
    pub current_ratio: Vec<Option<f64>>,
    pub return_on_equity: Vec<Option<f64>>,
    pub return_on_assets: Vec<Option<f64>>,
    pub net_profit_margin: Vec<Option<f64>>,
    pub debt_to_equity: Vec<Option<f64>>,
    pub price_to_book: Vec<Option<f64>>,
    pub price_to_sales: Vec<Option<f64>>,
    pub asset_turnover: Vec<Option<f64>>,
    /// Trailing four-quarter free cash flow over market cap; starts at the
    /// fourth quarter.
    pub fcf_yield: Vec<Option<f64>>,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den != 0.0).then(|| num / den)
}

fn positive_ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

/// Valuation ratios use the current `price` and `market_cap` for every
/// quarter, so their slopes track fundamentals against today's price.
pub fn derive_ratios(statements: &[QuarterlyStatement], price: f64, market_cap: f64) -> RatioSeries {
    let mut out = RatioSeries::default();
    let shares = (price != 0.0 && market_cap != 0.0).then(|| market_cap / price);

    for (i, s) in statements.iter().enumerate() {
        out.price_to_earnings.push(positive_ratio(price, s.eps));
        out.current_ratio.push(ratio(s.current_assets, s.current_liabilities));
        out.return_on_equity.push(positive_ratio(s.net_income, s.equity));
        out.return_on_assets.push(ratio(s.net_income, s.total_assets));
        out.net_profit_margin.push(ratio(s.net_income, s.revenue));
        out.debt_to_equity.push(positive_ratio(s.total_debt, s.equity));

        let book_per_share = shares.and_then(|n| ratio(s.equity, n));
        out.price_to_book
            .push(book_per_share.and_then(|bvps| positive_ratio(price, bvps)));

        out.price_to_sales.push(ratio(market_cap, s.revenue * 4.0));
        out.asset_turnover.push(ratio(s.revenue, s.total_assets));

        let fcf_yield = if i >= 3 {
            let trailing: f64 = statements[i - 3..=i]
                .iter()
                .map(QuarterlyStatement::free_cash_flow)
                .sum();
            ratio(trailing, market_cap)
        } else {
            None
        };
        out.fcf_yield.push(fcf_yield);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_for_one_quarter() {
        let s = QuarterlyStatement {
            revenue: 400.0,
            net_income: 40.0,
            eps: 2.0,
            total_assets: 800.0,
            equity: 200.0,
            current_assets: 300.0,
            current_liabilities: 150.0,
            total_debt: 100.0,
            ..Default::default()
        };

        let r = derive_ratios(&[s], 20.0, 2_000.0);

        assert_eq!(r.price_to_earnings, vec![Some(10.0)]);
        assert_eq!(r.current_ratio, vec![Some(2.0)]);
        assert_eq!(r.return_on_equity, vec![Some(0.2)]);
        assert_eq!(r.return_on_assets, vec![Some(0.05)]);
        assert_eq!(r.net_profit_margin, vec![Some(0.1)]);
        assert_eq!(r.debt_to_equity, vec![Some(0.5)]);
        // 100 shares, book value 2/share.
        assert_eq!(r.price_to_book, vec![Some(10.0)]);
        assert_eq!(r.price_to_sales, vec![Some(1.25)]);
        assert_eq!(r.asset_turnover, vec![Some(0.5)]);
        assert_eq!(r.fcf_yield, vec![None]);
    }

    #[test]
    fn losses_and_negative_equity_are_undefined() {
        let s = QuarterlyStatement {
            eps: -1.0,
            equity: -5.0,
            ..Default::default()
        };

        let r = derive_ratios(&[s], 20.0, 1_000.0);

        assert_eq!(r.price_to_earnings, vec![None]);
        assert_eq!(r.return_on_equity, vec![None]);
        assert_eq!(r.debt_to_equity, vec![None]);
        assert_eq!(r.current_ratio, vec![None]);
    }

    #[test]
    fn fcf_yield_uses_trailing_four_quarters() {
        let qs: Vec<QuarterlyStatement> = (0..5)
            .map(|i| QuarterlyStatement {
                operating_cash_flow: 10.0 * (i + 1) as f64,
                ..Default::default()
            })
            .collect();

        let r = derive_ratios(&qs, 10.0, 1_000.0);

        assert_eq!(r.fcf_yield[..3], [None, None, None]);
        assert_eq!(r.fcf_yield[3], Some(0.1));
        assert_eq!(r.fcf_yield[4], Some(0.14));
    }
}
