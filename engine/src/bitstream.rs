use std::iter;

use chrono::{DateTime, Utc};
use corelib::models::{Bar, Bit, BitEntry};
use tracing::trace;

use crate::bands::Bands;
use crate::rolling_window::RollingWindow;
use crate::stasis::StasisTracker;

/// Bits retained per pair; older entries are dropped.
pub const DEFAULT_BIT_CAPACITY: usize = 500;

/// Result of one `process_price` call.
///
/// Every bit emitted by a single call has the same value, so the emission is
/// a value plus a repeat count rather than a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emission {
    pub bit: Option<Bit>,
    pub count: u64,
}

impl Emission {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn bits(&self) -> impl Iterator<Item = Bit> {
        let count = if self.bit.is_some() { self.count } else { 0 };
        iter::repeat_n(self.bit.unwrap_or(Bit::Down), count as usize)
    }

    pub fn to_vec(&self) -> Vec<Bit> {
        self.bits().collect()
    }
}

/// Encoder state for one (instrument, threshold) pair, with its stasis
/// tracker embedded so both are guarded by the same lock.
#[derive(Clone, Debug, PartialEq)]
pub struct PairState {
    symbol: String,
    threshold: f64,
    volume: f64,
    bands: Bands,
    bits: RollingWindow<BitEntry>,
    stasis: StasisTracker,
    total_bits: u64,
    last_live_price: f64,
    last_update: DateTime<Utc>,
}

impl PairState {
    pub fn new(
        symbol: impl Into<String>,
        threshold: f64,
        initial_price: f64,
        volume: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::with_capacity(
            symbol,
            threshold,
            initial_price,
            volume,
            created_at,
            DEFAULT_BIT_CAPACITY,
        )
    }

    pub fn with_capacity(
        symbol: impl Into<String>,
        threshold: f64,
        initial_price: f64,
        volume: f64,
        created_at: DateTime<Utc>,
        capacity: usize,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            threshold,
            volume,
            bands: Bands::around(initial_price, threshold),
            bits: RollingWindow::new(capacity),
            stasis: StasisTracker::default(),
            total_bits: 0,
            last_live_price: initial_price,
            last_update: created_at,
        }
    }

    /// Feeds one price into the encoder.
    ///
    /// Prices strictly inside the band emit nothing. Otherwise
    /// `trunc((price - reference) / width)` bits are emitted (1 for up,
    /// 0 for down), the anchor moves to `price`, and the stasis tracker is
    /// refreshed once.
    pub fn process_price(&mut self, price: f64, timestamp: DateTime<Utc>) -> Emission {
        self.last_live_price = price;
        self.last_update = timestamp;

        if !price.is_finite() || self.bands.contains(price) || !(self.bands.width > 0.0) {
            return Emission::default();
        }

        let steps = ((price - self.bands.reference) / self.bands.width).trunc();
        let bit = if steps >= 1.0 {
            Bit::Up
        } else if steps <= -1.0 {
            Bit::Down
        } else {
            return Emission::default();
        };
        let count = steps.abs() as u64;

        let entry = BitEntry {
            bit,
            price,
            timestamp,
        };
        // Repeats beyond the ring capacity would be evicted immediately.
        let stored = count.min(self.bits.capacity() as u64);
        for _ in 0..stored {
            self.bits.push(entry);
        }
        self.total_bits = self.total_bits.saturating_add(count);

        self.bands = Bands::around(price, self.threshold);
        self.stasis.update(&self.bits);

        trace!(
            symbol = %self.symbol,
            threshold = self.threshold,
            bit = u8::from(bit),
            count,
            stasis = self.stasis.current(),
            "bits emitted"
        );

        Emission {
            bit: Some(bit),
            count,
        }
    }

    /// Replays bars in order; returns the number of bits emitted.
    pub fn replay(&mut self, bars: &[Bar]) -> u64 {
        bars.iter()
            .map(|bar| self.process_price(bar.close, bar.timestamp).len())
            .fold(0, u64::saturating_add)
    }

    /// `currentStasis >= min_stasis`, a direction is set, and the
    /// instrument trades more than one million shares a day.
    pub fn is_tradable(&self, min_stasis: usize) -> bool {
        self.stasis.current() >= min_stasis && self.stasis.direction().is_some() && self.volume > 1.0
    }

    /// The most recent `n` bits as a string of `0`/`1`.
    pub fn recent_bits(&self, n: usize) -> String {
        self.bits.tail(n).map(|e| e.bit.as_char()).collect()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn bands(&self) -> &Bands {
        &self.bands
    }

    pub fn reference_price(&self) -> f64 {
        self.bands.reference
    }

    pub fn bits(&self) -> &RollingWindow<BitEntry> {
        &self.bits
    }

    pub fn stasis(&self) -> &StasisTracker {
        &self.stasis
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    pub fn last_live_price(&self) -> f64 {
        self.last_live_price
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use corelib::models::{Direction, SignalStrength};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn breakout_emits_multiple_bits_and_moves_anchor() {
        let mut s = PairState::new("AAPL", 0.01, 100.0, 50.0, t(0));
        assert!(close(s.bands().lower, 99.0));
        assert!(close(s.bands().upper, 101.0));

        let out = s.process_price(102.0, t(1));

        assert_eq!(out.to_vec(), vec![Bit::Up, Bit::Up]);
        assert_eq!(s.reference_price(), 102.0);
        assert!(close(s.bands().lower, 100.98));
        assert!(close(s.bands().upper, 103.02));
        assert_eq!(s.total_bits(), 2);
        assert_eq!(s.stasis().current(), 2);
        assert_eq!(s.stasis().direction(), Some(Direction::Short));
    }

    #[test]
    fn in_band_price_is_a_no_op() {
        let mut s = PairState::new("MSFT", 0.01, 100.0, 50.0, t(0));

        let out = s.process_price(100.9, t(1));

        assert!(out.is_empty());
        assert_eq!(s.reference_price(), 100.0);
        assert_eq!(s.last_live_price(), 100.9);
        assert_eq!(s.last_update(), t(1));
    }

    #[test]
    fn downticks_emit_zero_bits() {
        let mut s = PairState::new("XOM", 0.01, 100.0, 50.0, t(0));

        let out = s.process_price(96.5, t(1));

        assert_eq!(out.bit, Some(Bit::Down));
        assert_eq!(out.len(), 3);
        assert_eq!(s.recent_bits(10), "000");
    }

    #[test]
    fn five_ticks_example() {
        let mut s = PairState::new("NVDA", 0.01, 100.0, 50.0, t(0));

        // Each tick leaves the band by one and a half widths: 0, 0, 1, 1, 1.
        let mut price = 100.0;
        for (i, up) in [false, false, true, true, true].into_iter().enumerate() {
            let width = price * 0.01 * 1.5;
            price = if up { price + width } else { price - width };
            s.process_price(price, t(i as i64 + 1));
        }

        assert_eq!(s.recent_bits(15), "00111");
        assert_eq!(s.stasis().current(), 3);
        assert_eq!(s.stasis().direction(), Some(Direction::Short));
        assert_eq!(s.stasis().strength(), Some(SignalStrength::Weak));
    }

    #[test]
    fn zero_threshold_never_emits() {
        let mut s = PairState::new("ZERO", 0.0, 100.0, 50.0, t(0));

        assert!(s.process_price(150.0, t(1)).is_empty());
        assert!(s.process_price(10.0, t(2)).is_empty());
        assert_eq!(s.total_bits(), 0);
    }

    #[test]
    fn non_finite_prices_are_ignored() {
        let mut s = PairState::new("NAN", 0.01, 100.0, 50.0, t(0));

        assert!(s.process_price(f64::NAN, t(1)).is_empty());
        assert!(s.process_price(f64::INFINITY, t(2)).is_empty());
        assert_eq!(s.reference_price(), 100.0);
    }

    #[test]
    fn huge_jump_is_bounded_by_capacity() {
        let mut s = PairState::with_capacity("JUMP", 0.5, 2.0, 50.0, t(0), 8);

        let out = s.process_price(1_000.0, t(1));

        assert_eq!(out.len(), 998);
        assert_eq!(s.total_bits(), 998);
        assert_eq!(s.bits().len(), 8);
        assert_eq!(s.stasis().current(), 8);
    }

    #[test]
    fn degenerate_threshold_saturates_bit_total() {
        let mut s = PairState::with_capacity("TINY", 1e-20, 100.0, 50.0, t(0), 8);

        s.process_price(200.0, t(1));
        assert_eq!(s.total_bits(), u64::MAX);

        let out = s.process_price(50.0, t(2));

        assert_eq!(out.bit, Some(Bit::Down));
        assert_eq!(s.reference_price(), 50.0);
        assert_eq!(s.total_bits(), u64::MAX);
        assert_eq!(s.bits().len(), 8);
    }

    #[test]
    fn tradability_requires_volume() {
        let mut liquid = PairState::new("LIQ", 0.01, 100.0, 5.0, t(0));
        let mut thin = PairState::new("THIN", 0.01, 100.0, 0.5, t(0));

        liquid.process_price(97.0, t(1));
        thin.process_price(97.0, t(1));

        assert!(liquid.is_tradable(3));
        assert!(!liquid.is_tradable(4));
        assert!(!thin.is_tradable(3));
    }

    #[test]
    fn replay_is_deterministic() {
        let bars: Vec<Bar> = [100.0, 101.5, 99.0, 97.2, 97.0, 95.1, 99.9, 103.0]
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: t(i as i64 * 60),
                close: *c,
            })
            .collect();

        let mut a = PairState::new("DET", 0.01, bars[0].close, 12.0, bars[0].timestamp);
        let mut b = a.clone();

        a.replay(&bars[1..]);
        b.replay(&bars[1..]);

        assert_eq!(a, b);
        assert!(a.total_bits() > 0);
    }
}
