//! Newline-delimited JSON price ticks: `{"symbol": "AAPL", "price": 187.2}`.

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::MarketError;
use crate::feed::PriceBoard;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
}

/// Parses one NDJSON line. Symbols are normalised to upper case.
pub fn parse_tick(line: &str) -> Result<Tick, MarketError> {
    let mut tick: Tick = serde_json::from_str(line)?;
    tick.symbol = tick.symbol.trim().to_ascii_uppercase();
    if tick.symbol.is_empty() {
        return Err(MarketError::Malformed("empty symbol".into()));
    }
    Ok(tick)
}

/// Reads ticks until EOF or shutdown, writing each into `board`.
///
/// Malformed lines are logged and skipped. Returns the number of accepted
/// ticks.
pub async fn pump_ticks<R>(
    reader: R,
    board: &PriceBoard,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64, MarketError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut accepted = 0u64;

    loop {
        let line = tokio::select! {
            _ = shutdown.changed() => break,
            line = lines.next_line() => line.map_err(|e| MarketError::io("<ticks>", e))?,
        };
        let Some(line) = line else {
            info!(accepted, "tick stream closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_tick(&line) {
            Ok(tick) => {
                if board.update(&tick.symbol, tick.price) {
                    accepted += 1;
                } else {
                    debug!(symbol = %tick.symbol, price = tick.price, "tick ignored");
                }
            }
            Err(e) => warn!(error = %e, "malformed tick line"),
        }
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalises_symbol() {
        let tick = parse_tick(r#"{"symbol": " aapl ", "price": 187.2}"#).unwrap();
        assert_eq!(
            tick,
            Tick {
                symbol: "AAPL".into(),
                price: 187.2
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_tick("not json"), Err(MarketError::Json(_))));
        assert!(matches!(
            parse_tick(r#"{"symbol": "", "price": 1.0}"#),
            Err(MarketError::Malformed(_))
        ));
    }
}
