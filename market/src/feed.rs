use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use corelib::models::FeedStatus;
use parking_lot::RwLock;

/// Source of the latest live price per instrument.
pub trait PriceFeed: Send + Sync {
    /// Every instrument that has a known price. Instruments never priced are
    /// absent, not zero.
    fn get_all_prices(&self) -> HashMap<String, f64>;

    fn get_status(&self) -> FeedStatus;
}

/// Thread-safe latest-price map fed by a tick reader.
///
/// Last write wins. Only finite, positive prices for instruments in the
/// configured universe are stored.
#[derive(Debug, Default)]
pub struct PriceBoard {
    universe: Vec<String>,
    prices: RwLock<HashMap<String, f64>>,
    messages: AtomicU64,
}

impl PriceBoard {
    pub fn new<I, S>(universe: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            universe: universe.into_iter().map(Into::into).collect(),
            prices: RwLock::new(HashMap::new()),
            messages: AtomicU64::new(0),
        }
    }

    /// Records one price message; returns whether it was accepted.
    pub fn update(&self, symbol: &str, price: f64) -> bool {
        self.messages.fetch_add(1, Ordering::Relaxed);

        if !price.is_finite() || price <= 0.0 {
            return false;
        }
        if !self.universe.iter().any(|s| s == symbol) {
            return false;
        }

        self.prices.write().insert(symbol.to_string(), price);
        true
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.read().get(symbol).copied()
    }
}

impl PriceFeed for PriceBoard {
    fn get_all_prices(&self) -> HashMap<String, f64> {
        self.prices.read().clone()
    }

    fn get_status(&self) -> FeedStatus {
        FeedStatus {
            total_instruments: self.universe.len(),
            connected_count: self.prices.read().len(),
            message_count: self.messages.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let board = PriceBoard::new(["AAPL", "MSFT"]);

        assert!(board.update("AAPL", 187.2));
        assert!(board.update("AAPL", 188.0));

        assert_eq!(board.get("AAPL"), Some(188.0));
        assert_eq!(board.get("MSFT"), None);
    }

    #[test]
    fn rejects_unknown_symbols_and_bad_prices() {
        let board = PriceBoard::new(["AAPL"]);

        assert!(!board.update("TSLA", 250.0));
        assert!(!board.update("AAPL", f64::NAN));
        assert!(!board.update("AAPL", 0.0));
        assert!(!board.update("AAPL", -3.0));

        assert!(board.get_all_prices().is_empty());
    }

    #[test]
    fn status_counts_every_message() {
        let board = PriceBoard::new(["AAPL", "MSFT", "NVDA"]);
        board.update("AAPL", 1.0);
        board.update("MSFT", 2.0);
        board.update("BOGUS", 3.0);

        let status = board.get_status();
        assert_eq!(status.total_instruments, 3);
        assert_eq!(status.connected_count, 2);
        assert_eq!(status.message_count, 3);
    }
}
