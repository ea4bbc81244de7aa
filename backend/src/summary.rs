use corelib::models::{Direction, Snapshot};
use serde::Serialize;

/// Aggregate view of one published snapshot collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub pairs: usize,
    pub tradable: usize,
    pub long: usize,
    pub short: usize,
    /// Averages over tradable pairs only.
    pub avg_fundamental: Option<f64>,
    pub avg_combined: Option<f64>,
    pub max_combined: u32,
}

impl SnapshotSummary {
    pub fn of(snapshots: &[Snapshot]) -> Self {
        let tradable: Vec<&Snapshot> = snapshots.iter().filter(|s| s.is_tradable).collect();

        let count = |d: Direction| tradable.iter().filter(|s| s.direction == Some(d)).count();
        let avg = |f: fn(&Snapshot) -> u32| {
            (!tradable.is_empty()).then(|| {
                tradable.iter().map(|s| f(s) as f64).sum::<f64>() / tradable.len() as f64
            })
        };

        Self {
            pairs: snapshots.len(),
            tradable: tradable.len(),
            long: count(Direction::Long),
            short: count(Direction::Short),
            avg_fundamental: avg(|s| s.fundamental_merit),
            avg_combined: avg(|s| s.combined_merit),
            max_combined: snapshots.iter().map(|s| s.combined_merit).max().unwrap_or(0),
        }
    }
}
