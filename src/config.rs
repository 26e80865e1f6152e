use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alert_history::{
    HistoryLimits, DEFAULT_CAPACITY, DEFAULT_DEDUP_LOOKBACK, DEFAULT_DEDUP_WINDOW_SECS,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market_data: MarketDataConfig,
    pub ott: OttConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataConfig {
    pub base_url: String,
    /// Lookback range understood by the chart API, e.g. "5d".
    pub range: String,
    /// Bar interval, e.g. "30m".
    pub interval: String,
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OttConfig {
    pub length: usize,
    pub percent: f64,
    #[serde(default = "default_signal_lookback")]
    pub signal_lookback: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub watchlist: Vec<String>,
    pub scan_interval_secs: u64,
    #[serde(default = "default_symbol_pause_ms")]
    pub symbol_pause_ms: u64,
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    pub capacity: usize,
    pub dedup_lookback: usize,
    pub dedup_window_secs: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            dedup_lookback: DEFAULT_DEDUP_LOOKBACK,
            dedup_window_secs: DEFAULT_DEDUP_WINDOW_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(skip)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_min_points() -> usize {
    20
}

fn default_signal_lookback() -> usize {
    3
}

fn default_symbol_pause_ms() -> u64 {
    500
}

fn default_error_backoff_secs() -> u64 {
    60
}

/// Parse a bar interval string (e.g. "30s", "5m", "1h", "1d", "1wk", "1mo") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid interval '{}': expected format like '30m'", s))?;
    let (num_str, suffix) = s.split_at(split);
    if num_str.is_empty() {
        bail!("invalid interval '{}': expected format like '30m'", s);
    }
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "wk" => 7 * 86_400_000,
        "mo" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/wk/mo",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl MarketDataConfig {
    pub fn interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.interval)
    }
}

impl MonitorConfig {
    /// Watchlist symbols, trimmed, upper-cased and deduplicated in order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for sym in &self.watchlist {
            let s = sym.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn symbol_pause(&self) -> Duration {
        Duration::from_millis(self.symbol_pause_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

impl AlertsConfig {
    pub fn limits(&self) -> HistoryLimits {
        HistoryLimits {
            capacity: self.capacity,
            dedup_lookback: self.dedup_lookback,
            dedup_window: chrono::Duration::seconds(self.dedup_window_secs),
        }
    }
}

impl Config {
    /// Load from `OTT_CONFIG` or `config/default.toml`, with secrets from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var("OTT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::from_file(&config_path)?;

        config.notify.webhook_url = std::env::var("OTT_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.market_data
            .interval_ms()
            .context("market_data.interval is invalid")?;
        if self.ott.length == 0 {
            bail!("ott.length must be > 0");
        }
        if !(self.ott.percent.is_finite() && self.ott.percent > 0.0) {
            bail!("ott.percent must be > 0, got {}", self.ott.percent);
        }
        if self.ott.signal_lookback == 0 {
            bail!("ott.signal_lookback must be > 0");
        }
        if self.monitor.symbols().is_empty() {
            bail!("monitor.watchlist must contain at least one symbol");
        }
        if self.alerts.capacity == 0 {
            bail!("alerts.capacity must be > 0");
        }
        Ok(())
    }
}
