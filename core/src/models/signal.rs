use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discretized move of at least one band width away from the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Bit {
    /// Price left the band through the lower edge.
    Down = 0,
    /// Price left the band through the upper edge.
    Up = 1,
}

impl Bit {
    pub fn as_char(self) -> char {
        match self {
            Bit::Down => '0',
            Bit::Up => '1',
        }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit as u8
    }
}

impl TryFrom<u8> for Bit {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Bit::Down),
            1 => Ok(Bit::Up),
            other => Err(format!("bit must be 0 or 1, got {other}")),
        }
    }
}

/// A bit together with the price and time at which it was emitted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BitEntry {
    pub bit: Bit,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Contrarian bias derived from the trailing run of bits.
///
/// A run of downticks suggests exhaustion to the downside (LONG), a run of
/// upticks the opposite (SHORT).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_trailing_bit(bit: Bit) -> Self {
        match bit {
            Bit::Down => Direction::Long,
            Bit::Up => Direction::Short,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl SignalStrength {
    /// Buckets a run length; runs shorter than 3 carry no strength.
    pub fn from_stasis(stasis: usize) -> Option<Self> {
        match stasis {
            10.. => Some(SignalStrength::VeryStrong),
            7..=9 => Some(SignalStrength::Strong),
            5..=6 => Some(SignalStrength::Moderate),
            3..=4 => Some(SignalStrength::Weak),
            _ => None,
        }
    }
}
