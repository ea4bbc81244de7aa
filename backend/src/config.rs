use std::path::PathBuf;
use std::time::Duration;

use corelib::models::Threshold;

use crate::error::AppError;

pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "AVGO", "ORCL", "AMD",
];

pub const DEFAULT_THRESHOLDS: &[f64] = &[
    0.005, 0.0075, 0.01, 0.0125, 0.015, 0.02, 0.025, 0.03, 0.04, 0.05,
];

/// Narrower bands make a single move worth more bits than a counter can hold.
pub const MIN_THRESHOLD: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Instrument universe, upper case, duplicates removed in order.
    pub symbols: Vec<String>,

    /// Band widths as fractions of the anchor price (0.01 = 1%).
    pub thresholds: Vec<Threshold>,

    /// Root for `bars/<SYMBOL>.json` and `reference.json`.
    pub data_dir: PathBuf,

    // =========================
    // Loop cadence
    // =========================
    pub ingest_interval: Duration,
    pub snapshot_interval: Duration,

    // =========================
    // Backfill
    // =========================
    pub history_days: u32,

    /// Pause between consecutive historical fetches.
    pub backfill_delay: Duration,

    // =========================
    // Encoder / snapshot
    // =========================
    pub min_tradable_stasis: usize,
    pub bit_capacity: usize,
    pub recent_bits: usize,

    /// Volume (millions/day) assumed when no volume data is known.
    pub default_volume: f64,

    /// JSON log lines instead of the pretty formatter.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            thresholds: DEFAULT_THRESHOLDS
                .iter()
                .filter_map(|t| Threshold::new(*t))
                .collect(),
            data_dir: PathBuf::from("data"),
            ingest_interval: Duration::from_millis(100),
            snapshot_interval: Duration::from_millis(500),
            history_days: 5,
            backfill_delay: Duration::from_millis(120),
            min_tradable_stasis: 3,
            bit_capacity: engine::DEFAULT_BIT_CAPACITY,
            recent_bits: 15,
            default_volume: 10.0,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` knows about.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("STASIS_SYMBOLS") {
            cfg.symbols = parse_symbols(&raw);
        }
        if let Some(raw) = lookup("STASIS_THRESHOLDS") {
            cfg.thresholds = parse_thresholds(&raw)?;
        }
        if let Some(raw) = lookup("STASIS_DATA_DIR") {
            cfg.data_dir = PathBuf::from(raw);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "STASIS_INGEST_MS")? {
            cfg.ingest_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "STASIS_SNAPSHOT_MS")? {
            cfg.snapshot_interval = Duration::from_millis(ms);
        }
        if let Some(days) = parse_var::<u32>(&lookup, "STASIS_HISTORY_DAYS")? {
            cfg.history_days = days;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "STASIS_BACKFILL_DELAY_MS")? {
            cfg.backfill_delay = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "STASIS_MIN_TRADABLE")? {
            cfg.min_tradable_stasis = n;
        }
        cfg.json_logs = lookup("APP_ENV").is_some_and(|v| v == "production");

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.symbols.is_empty() {
            return Err(AppError::InvalidConfig("no symbols configured".into()));
        }
        if self.thresholds.is_empty() {
            return Err(AppError::InvalidConfig("no thresholds configured".into()));
        }
        if let Some(t) = self.thresholds.iter().find(|t| t.value() < MIN_THRESHOLD) {
            return Err(AppError::InvalidConfig(format!(
                "threshold {} is below the {MIN_THRESHOLD} minimum",
                t.value()
            )));
        }
        if self.ingest_interval.is_zero() || self.snapshot_interval.is_zero() {
            return Err(AppError::InvalidConfig("loop intervals must be non-zero".into()));
        }
        if self.bit_capacity == 0 {
            return Err(AppError::InvalidConfig("bit capacity must be positive".into()));
        }
        Ok(())
    }
}

/// Comma separated, trimmed, upper-cased, first occurrence wins.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_ascii_uppercase()) {
        if !symbol.is_empty() && !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}

/// Comma separated fractions; any non-positive or non-finite entry fails.
pub fn parse_thresholds(raw: &str) -> Result<Vec<Threshold>, AppError> {
    let mut out: Vec<Threshold> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value: f64 = part
            .parse()
            .map_err(|_| AppError::InvalidConfig(format!("threshold {part:?} is not a number")))?;
        let threshold = Threshold::new(value).ok_or_else(|| {
            AppError::InvalidConfig(format!("threshold {part} must be positive and finite"))
        })?;
        if !out.contains(&threshold) {
            out.push(threshold);
        }
    }
    Ok(out)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| AppError::InvalidConfig(format!("{key}={raw:?} is not valid")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.thresholds.len(), 10);
        assert_eq!(cfg.ingest_interval, Duration::from_millis(100));
        assert_eq!(cfg.snapshot_interval, Duration::from_millis(500));
        assert_eq!(cfg.recent_bits, 15);
        assert_eq!(cfg.default_volume, 10.0);
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("STASIS_SYMBOLS", "aapl, msft,AAPL,,nvda"),
            ("STASIS_THRESHOLDS", "0.01,0.02,0.01"),
            ("STASIS_INGEST_MS", "250"),
            ("STASIS_MIN_TRADABLE", "4"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(cfg.symbols, vec!["AAPL", "MSFT", "NVDA"]);
        let values: Vec<f64> = cfg.thresholds.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![0.01, 0.02]);
        assert_eq!(cfg.ingest_interval, Duration::from_millis(250));
        assert_eq!(cfg.min_tradable_stasis, 4);
        assert!(cfg.json_logs);
    }

    #[test]
    fn bad_values_are_rejected() {
        for vars in [
            [("STASIS_THRESHOLDS", "0.01,-0.5")],
            [("STASIS_THRESHOLDS", "abc")],
            [("STASIS_THRESHOLDS", "0.01,1e-20")],
            [("STASIS_SYMBOLS", " , ")],
            [("STASIS_SNAPSHOT_MS", "0")],
            [("STASIS_HISTORY_DAYS", "-1")],
        ] {
            let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, AppError::InvalidConfig(_)), "{vars:?}");
        }
    }
}
