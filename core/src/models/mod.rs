pub mod fundamentals;
pub mod market;
pub mod signal;
pub mod snapshot;

pub use fundamentals::{FundamentalSlopes, Metric, QuarterlyStatement, SlopePair};
pub use market::{Bar, DailyBar, FeedStatus, PairKey, Threshold, Week52Range};
pub use signal::{Bit, BitEntry, Direction, SignalStrength};
pub use snapshot::{SlopeDetails, Snapshot};
