use chrono::{DateTime, Utc};
use corelib::models::{FundamentalSlopes, Snapshot, Week52Range};

use crate::bands::RewardFrame;
use crate::bitstream::PairState;
use crate::merit::{self, StasisMeritInput};

/// Everything a snapshot needs besides the pair state itself. Looked up by
/// the caller before the pair lock is taken.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotContext<'a> {
    /// Latest feed price; falls back to the pair's last seen price.
    pub live_price: Option<f64>,
    pub range: Option<Week52Range>,
    pub slopes: Option<&'a FundamentalSlopes>,
    pub min_tradable_stasis: usize,
    pub recent_bits: usize,
    pub now: DateTime<Utc>,
}

/// Derives the immutable snapshot for one pair.
pub fn build_snapshot(state: &PairState, ctx: &SnapshotContext<'_>) -> Snapshot {
    let price = ctx.live_price.unwrap_or(state.last_live_price());
    let stasis = state.stasis();
    let info = stasis.info();
    let bands = state.bands();

    let frame = RewardFrame::compute(stasis.direction(), stasis.current(), bands, price);
    let week52_percentile = ctx.range.and_then(|r| r.percentile(price));
    let duration_seconds = info.map_or(0.0, |i| i.duration_secs(ctx.now));

    let scores = merit::score(
        &StasisMeritInput {
            stasis: stasis.current(),
            risk_reward: frame.and_then(|f| f.risk_reward),
            strength: stasis.strength(),
            duration_secs: duration_seconds,
        },
        ctx.slopes,
        week52_percentile,
    );

    Snapshot {
        symbol: state.symbol().to_string(),
        threshold: state.threshold(),
        threshold_pct: state.threshold() * 100.0,

        stasis: stasis.current(),
        peak_stasis: info.map(|i| i.peak_stasis),
        total_bits: state.total_bits(),
        recent_bits: state.recent_bits(ctx.recent_bits),

        current_price: price,
        reference_price: bands.reference,
        upper_band: bands.upper,
        lower_band: bands.lower,
        anchor_price: info.map(|i| i.start_price),

        direction: stasis.direction(),
        signal_strength: stasis.strength(),
        is_tradable: state.is_tradable(ctx.min_tradable_stasis),

        stasis_start: info.map(|i| i.start_time),
        stasis_start_label: info.map(|i| i.start_label()),
        duration_seconds,
        duration_label: info.map(|i| i.duration_label(ctx.now)),
        stasis_price_change_pct: info.map(|i| i.price_change_pct(price)),

        take_profit: frame.map(|f| f.take_profit),
        stop_loss: frame.map(|f| f.stop_loss),
        risk_reward: frame.and_then(|f| f.risk_reward),
        distance_to_tp_pct: frame.and_then(|f| f.distance_to_tp_pct),
        distance_to_sl_pct: frame.and_then(|f| f.distance_to_sl_pct),

        week52_percentile,
        volume: state.volume(),

        stasis_merit: scores.stasis,
        fundamental_merit: scores.fundamental,
        combined_merit: scores.combined,
        slope_details: scores.slope_details,

        last_update: state.last_update(),
    }
}
