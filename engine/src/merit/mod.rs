//! Heuristic merit scores: one from the bit pattern, one from fundamentals.
//! The combined score is their plain sum.

mod fundamental;
mod stasis;
mod tiers;

use corelib::models::{FundamentalSlopes, SlopeDetails};

pub use fundamental::{FUNDAMENTAL_MERIT_MAX, FundamentalMerit, fundamental_merit};
pub use stasis::{STASIS_MERIT_MAX, StasisMeritInput, stasis_merit};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeritScores {
    pub stasis: u32,
    pub fundamental: u32,
    pub combined: u32,
    pub slope_details: SlopeDetails,
}

pub fn score(
    input: &StasisMeritInput,
    slopes: Option<&FundamentalSlopes>,
    week52_percentile: Option<f64>,
) -> MeritScores {
    let stasis = stasis_merit(input);
    let FundamentalMerit { score, details } = fundamental_merit(slopes, week52_percentile);

    MeritScores {
        stasis,
        fundamental: score,
        combined: stasis + score,
        slope_details: details,
    }
}
