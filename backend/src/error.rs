use corelib::models::PairKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unknown pair: {0}")]
    UnknownPair(PairKey),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Market(#[from] market::MarketError),
}
