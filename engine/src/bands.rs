use corelib::models::Direction;

/// Adaptive envelope around the current anchor price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bands {
    pub reference: f64,
    pub width: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Bands {
    pub fn around(reference: f64, threshold: f64) -> Self {
        let width = threshold * reference;
        Self {
            reference,
            width,
            upper: reference + width,
            lower: reference - width,
        }
    }

    /// Strictly inside `(lower, upper)`; touching an edge counts as outside.
    pub fn contains(&self, price: f64) -> bool {
        self.lower < price && price < self.upper
    }
}

/// Trade framing for an active stasis: where to take profit, where to stop
/// out, and the resulting reward per unit of risk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardFrame {
    pub take_profit: f64,
    pub stop_loss: f64,
    pub risk_reward: Option<f64>,
    pub distance_to_tp_pct: Option<f64>,
    pub distance_to_sl_pct: Option<f64>,
}

impl RewardFrame {
    /// `None` unless a direction is set and the run is at least 2 long.
    pub fn compute(
        direction: Option<Direction>,
        stasis: usize,
        bands: &Bands,
        price: f64,
    ) -> Option<Self> {
        let direction = direction?;
        if stasis < 2 {
            return None;
        }

        let (take_profit, stop_loss, reward, risk) = match direction {
            Direction::Long => (
                bands.upper,
                bands.lower,
                bands.upper - price,
                price - bands.lower,
            ),
            Direction::Short => (
                bands.lower,
                bands.upper,
                price - bands.lower,
                bands.upper - price,
            ),
        };

        Some(Self {
            take_profit,
            stop_loss,
            risk_reward: risk_reward(reward, risk),
            distance_to_tp_pct: distance_pct(take_profit, price),
            distance_to_sl_pct: distance_pct(stop_loss, price),
        })
    }
}

/// Never negative: a reward that has already been overrun scores 0, and no
/// ratio exists once risk is gone.
pub fn risk_reward(reward: f64, risk: f64) -> Option<f64> {
    if !(risk > 0.0) {
        return None;
    }
    if reward > 0.0 {
        Some(reward / risk)
    } else {
        Some(0.0)
    }
}

fn distance_pct(level: f64, price: f64) -> Option<f64> {
    (price > 0.0).then(|| (level - price).abs() / price * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bands_are_symmetric_around_reference() {
        let b = Bands::around(100.0, 0.01);
        assert!(close(b.lower, 99.0));
        assert!(close(b.upper, 101.0));
        assert!(b.contains(100.5));
        assert!(!b.contains(101.0));
        assert!(!b.contains(99.0));
    }

    #[test]
    fn long_frame_uses_upper_as_target() {
        let b = Bands::around(100.0, 0.01);
        let f = RewardFrame::compute(Some(Direction::Long), 3, &b, 99.5).unwrap();

        assert!(close(f.take_profit, 101.0));
        assert!(close(f.stop_loss, 99.0));
        assert!(close(f.risk_reward.unwrap(), 3.0));
        assert!(close(f.distance_to_tp_pct.unwrap(), 1.5 / 99.5 * 100.0));
    }

    #[test]
    fn short_frame_past_target_scores_zero() {
        let b = Bands::around(100.0, 0.01);
        let f = RewardFrame::compute(Some(Direction::Short), 4, &b, 98.5).unwrap();

        assert!(close(f.take_profit, 99.0));
        assert!(close(f.stop_loss, 101.0));
        assert_eq!(f.risk_reward, Some(0.0));
    }

    #[test]
    fn no_ratio_when_stop_already_crossed() {
        let b = Bands::around(100.0, 0.01);
        let f = RewardFrame::compute(Some(Direction::Long), 2, &b, 98.9).unwrap();

        assert_eq!(f.risk_reward, None);
    }

    #[test]
    fn inactive_without_direction_or_run() {
        let b = Bands::around(100.0, 0.01);
        assert!(RewardFrame::compute(None, 5, &b, 100.0).is_none());
        assert!(RewardFrame::compute(Some(Direction::Long), 1, &b, 100.0).is_none());
    }

    #[test]
    fn distances_undefined_for_non_positive_price() {
        let b = Bands::around(100.0, 0.01);
        let f = RewardFrame::compute(Some(Direction::Short), 2, &b, 0.0).unwrap();
        assert_eq!(f.distance_to_tp_pct, None);
        assert_eq!(f.distance_to_sl_pct, None);
    }
}
