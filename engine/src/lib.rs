//! Pure, synchronous signal computation.
//!
//! Everything in this crate operates on owned per-pair state and plain
//! inputs; locking and scheduling live in the backend.

pub mod bands;
pub mod bitstream;
pub mod fundamentals;
pub mod merit;
pub mod rolling_window;
pub mod snapshot;
pub mod stasis;

pub use bands::{Bands, RewardFrame};
pub use bitstream::{DEFAULT_BIT_CAPACITY, PairState};
pub use merit::{MeritScores, fundamental_merit, score, stasis_merit};
pub use snapshot::{SnapshotContext, build_snapshot};
pub use stasis::{StasisInfo, StasisTracker};
