use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed market data: {0}")]
    Malformed(String),
}

impl MarketError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
