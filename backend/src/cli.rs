use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{AppConfig, parse_symbols, parse_thresholds};
use crate::error::AppError;

/// Command-line overrides; anything left unset keeps the environment or
/// default value.
#[derive(Debug, Default, Parser)]
#[clap(name = "stasis", version)]
pub struct Cli {
    /// Instruments to track (comma-separated)
    #[clap(long)]
    pub symbols: Option<String>,

    /// Band thresholds as fractions, e.g. "0.005,0.01"
    #[clap(long)]
    pub thresholds: Option<String>,

    /// Directory holding bars/<SYMBOL>.json and reference.json
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    #[clap(long)]
    pub ingest_ms: Option<u64>,

    #[clap(long)]
    pub snapshot_ms: Option<u64>,

    #[clap(long)]
    pub history_days: Option<u32>,

    #[clap(long)]
    pub min_tradable: Option<usize>,

    /// Print the last published snapshots as JSON on shutdown
    #[clap(long)]
    pub dump: bool,

    /// Emit JSON log lines
    #[clap(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Layers the flags over `cfg` and re-validates.
    pub fn apply(&self, mut cfg: AppConfig) -> Result<AppConfig, AppError> {
        if let Some(raw) = &self.symbols {
            cfg.symbols = parse_symbols(raw);
        }
        if let Some(raw) = &self.thresholds {
            cfg.thresholds = parse_thresholds(raw)?;
        }
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if let Some(ms) = self.ingest_ms {
            cfg.ingest_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.snapshot_ms {
            cfg.snapshot_interval = Duration::from_millis(ms);
        }
        if let Some(days) = self.history_days {
            cfg.history_days = days;
        }
        if let Some(n) = self.min_tradable {
            cfg.min_tradable_stasis = n;
        }
        cfg.json_logs |= self.json_logs;

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "stasis",
            "--symbols",
            "tsla,nvda",
            "--thresholds",
            "0.02",
            "--snapshot-ms",
            "1000",
            "--dump",
        ]);

        let cfg = cli.apply(AppConfig::default()).unwrap();

        assert_eq!(cfg.symbols, vec!["TSLA", "NVDA"]);
        assert_eq!(cfg.thresholds.len(), 1);
        assert_eq!(cfg.snapshot_interval, Duration::from_millis(1000));
        assert_eq!(cfg.ingest_interval, Duration::from_millis(100));
        assert!(cli.dump);
    }

    #[test]
    fn no_flags_keeps_config() {
        let cfg = Cli::default().apply(AppConfig::default()).unwrap();
        assert_eq!(cfg.symbols, AppConfig::default().symbols);
    }

    #[test]
    fn invalid_flags_fail_validation() {
        let cli = Cli::parse_from(["stasis", "--ingest-ms", "0"]);
        assert!(matches!(
            cli.apply(AppConfig::default()),
            Err(AppError::InvalidConfig(_))
        ));
    }
}
