use corelib::models::SlopePair;

/// EMA span for the short-horizon slope.
pub const SHORT_SPAN: usize = 4;
/// EMA span for the long-horizon slope.
pub const LONG_SPAN: usize = 20;

const MIN_DENOMINATOR: f64 = 1e-4;

/// Recursive exponential moving average with `alpha = 2 / (span + 1)`,
/// seeded by the first observation.
///
/// Missing or non-finite observations report the previous average but still
/// age it: an observation arriving `k` periods after the last one is blended
/// as `((1 - alpha)^k * prev + alpha * v) / ((1 - alpha)^k + alpha)`.
/// Positions before the first observation stay `None`.
pub fn ema(series: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    // Periods since the last observation.
    let mut elapsed: i32 = 0;

    series
        .iter()
        .map(|value| {
            let value = value.filter(|v| v.is_finite());
            elapsed = elapsed.saturating_add(1);
            match (prev, value) {
                (None, v) => {
                    prev = v;
                    elapsed = 0;
                }
                (Some(p), Some(v)) => {
                    let decay = (1.0 - alpha).powi(elapsed);
                    prev = Some((decay * p + alpha * v) / (decay + alpha));
                    elapsed = 0;
                }
                (Some(_), None) => {}
            }
            prev
        })
        .collect()
}

/// Fractional change of the EMA over the last `lag` periods:
/// `(ema_now - ema_lag_ago) / |ema_lag_ago|`.
///
/// Undefined with fewer than `lag + 1` finite observations or when the
/// older average is within `1e-4` of zero.
pub fn slope(series: &[Option<f64>], span: usize, lag: usize) -> Option<f64> {
    let observed = series.iter().flatten().filter(|v| v.is_finite()).count();
    if series.len() <= lag || observed <= lag {
        return None;
    }

    let averaged = ema(series, span);
    let now = averaged[averaged.len() - 1]?;
    let then = averaged[averaged.len() - 1 - lag]?;

    if then.abs() <= MIN_DENOMINATOR {
        return None;
    }
    Some((now - then) / then.abs())
}

/// Short (span 4, lag 4) and long (span 20, lag 20) slopes.
pub fn slope_pair(series: &[Option<f64>]) -> SlopePair {
    // Nothing at all below five quarters, matching the short minimum.
    if series.len() < SHORT_SPAN + 1 {
        return SlopePair::default();
    }
    SlopePair {
        short: slope(series, SHORT_SPAN, SHORT_SPAN),
        long: slope(series, LONG_SPAN, LONG_SPAN),
    }
}
