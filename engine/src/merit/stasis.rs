use corelib::models::SignalStrength;

use super::tiers::at_least;

pub const STASIS_MERIT_MAX: u32 = 22;

const STASIS_TIERS: &[(usize, u32)] = &[
    (15, 10),
    (12, 9),
    (10, 8),
    (8, 7),
    (7, 6),
    (6, 5),
    (5, 4),
    (4, 3),
    (3, 2),
    (2, 1),
];

const RISK_REWARD_TIERS: &[(f64, u32)] = &[(3.0, 5), (2.5, 4), (2.0, 3), (1.5, 2), (1.0, 1)];

const DURATION_TIERS: &[(f64, u32)] = &[(3_600.0, 3), (1_800.0, 2), (900.0, 1)];

/// Pattern attributes of one pair that feed the stasis merit score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StasisMeritInput {
    pub stasis: usize,
    pub risk_reward: Option<f64>,
    pub strength: Option<SignalStrength>,
    pub duration_secs: f64,
}

/// Stasis Merit Score in `[0, 22]`: run length (0-10), risk:reward (0-5),
/// signal strength (0-4) and run duration (0-3).
pub fn stasis_merit(input: &StasisMeritInput) -> u32 {
    let stasis = STASIS_TIERS
        .iter()
        .find(|(min, _)| input.stasis >= *min)
        .map_or(0, |(_, points)| *points);

    let rr = input.risk_reward.map_or(0, |rr| at_least(rr, RISK_REWARD_TIERS));

    let strength = match input.strength {
        Some(SignalStrength::VeryStrong) => 4,
        Some(SignalStrength::Strong) => 3,
        Some(SignalStrength::Moderate) => 2,
        Some(SignalStrength::Weak) => 1,
        None => 0,
    };

    let duration = at_least(input.duration_secs, DURATION_TIERS);

    stasis + rr + strength + duration
}
