use chrono::{DateTime, Utc};
use corelib::models::{Bit, BitEntry, Direction, SignalStrength};

use crate::rolling_window::RollingWindow;

/// Metadata about the live stasis run; only exists while the run is at
/// least 2 bits long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StasisInfo {
    pub start_time: DateTime<Utc>,
    pub start_price: f64,
    pub peak_stasis: usize,
}

impl StasisInfo {
    /// Seconds since the run started; never negative.
    pub fn duration_secs(&self, now: DateTime<Utc>) -> f64 {
        let ms = (now - self.start_time).num_milliseconds().max(0);
        ms as f64 / 1000.0
    }

    pub fn duration_label(&self, now: DateTime<Utc>) -> String {
        let total = self.duration_secs(now) as u64;
        match total {
            0..60 => format!("{total}s"),
            60..3600 => format!("{}m {}s", total / 60, total % 60),
            _ => format!("{}h {}m", total / 3600, (total % 3600) / 60),
        }
    }

    pub fn start_label(&self) -> String {
        self.start_time.format("%m/%d %H:%M").to_string()
    }

    pub fn price_change_pct(&self, price: f64) -> f64 {
        if self.start_price == 0.0 {
            return 0.0;
        }
        (price - self.start_price) / self.start_price * 100.0
    }
}

/// Run-length statistics over the tail of a bit history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StasisTracker {
    current: usize,
    last_bit: Option<Bit>,
    direction: Option<Direction>,
    strength: Option<SignalStrength>,
    info: Option<StasisInfo>,
}

impl StasisTracker {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn last_bit(&self) -> Option<Bit> {
        self.last_bit
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn strength(&self) -> Option<SignalStrength> {
        self.strength
    }

    pub fn info(&self) -> Option<&StasisInfo> {
        self.info.as_ref()
    }

    /// Recomputes the trailing run after new bits were appended.
    pub fn update(&mut self, bits: &RollingWindow<BitEntry>) {
        let Some(latest) = bits.latest() else {
            *self = Self::default();
            return;
        };

        if bits.len() < 2 {
            self.current = bits.len();
            self.last_bit = Some(latest.bit);
            self.direction = None;
            self.strength = None;
            self.info = None;
            return;
        }

        let run = bits.iter().rev().take_while(|e| e.bit == latest.bit).count();
        let prev_run = self.current;
        let prev_bit = self.last_bit;

        self.current = run;
        self.last_bit = Some(latest.bit);

        if run >= 2 {
            // A flip in the trailing bit means the old run broke and a new
            // one began within a single update.
            let continues = prev_run >= 2 && prev_bit == Some(latest.bit);
            match self.info.as_mut() {
                Some(info) if continues => {
                    info.peak_stasis = info.peak_stasis.max(run);
                }
                _ => {
                    let first = bits.get(bits.len() - run).unwrap_or(latest);
                    self.info = Some(StasisInfo {
                        start_time: first.timestamp,
                        start_price: first.price,
                        peak_stasis: run,
                    });
                }
            }
            self.direction = Some(Direction::from_trailing_bit(latest.bit));
            self.strength = SignalStrength::from_stasis(run);
        } else {
            self.info = None;
            self.direction = None;
            self.strength = None;
        }
    }
}
