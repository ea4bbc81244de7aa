use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Direction, SignalStrength};

/// Raw slope inputs that fed the fundamental merit score, keyed by a short
/// display label (`Rev_5`, `FCF_20`, `FCFY`, ...).
pub type SlopeDetails = BTreeMap<String, Option<f64>>;

/// Immutable, fully-derived view of one bitstream at publish time.
///
/// This is the only shape that leaves the engine; consumers never see the
/// mutable pair state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub threshold: f64,
    pub threshold_pct: f64,

    pub stasis: usize,
    pub peak_stasis: Option<usize>,
    pub total_bits: u64,
    pub recent_bits: String,

    pub current_price: f64,
    pub reference_price: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    /// Price at which the current stasis run started.
    pub anchor_price: Option<f64>,

    pub direction: Option<Direction>,
    pub signal_strength: Option<SignalStrength>,
    pub is_tradable: bool,

    pub stasis_start: Option<DateTime<Utc>>,
    pub stasis_start_label: Option<String>,
    pub duration_seconds: f64,
    pub duration_label: Option<String>,
    pub stasis_price_change_pct: Option<f64>,

    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub risk_reward: Option<f64>,
    pub distance_to_tp_pct: Option<f64>,
    pub distance_to_sl_pct: Option<f64>,

    pub week52_percentile: Option<f64>,
    pub volume: f64,

    pub stasis_merit: u32,
    pub fundamental_merit: u32,
    pub combined_merit: u32,
    pub slope_details: SlopeDetails,

    pub last_update: DateTime<Utc>,
}
