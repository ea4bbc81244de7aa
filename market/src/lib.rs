//! Collaborators the stream engine talks to: live prices, historical bars
//! and per-instrument reference data.

pub mod errors;
pub mod feed;
pub mod history;
pub mod reference;
pub mod ticks;

pub use errors::MarketError;
pub use feed::{PriceBoard, PriceFeed};
pub use history::{BarSource, JsonBarArchive};
pub use reference::{ReferenceBook, ReferenceEntry, ReferenceRecord, ReferenceSource};
pub use ticks::{Tick, parse_tick, pump_ticks};
