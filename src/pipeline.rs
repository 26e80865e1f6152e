use chrono::{DateTime, Local};

use crate::config::OttConfig;
use crate::error::IndicatorError;
use crate::indicator::{compute_indicators, detect_signals, Crossovers, OttOutput};
use crate::model::price::PriceSeries;
use crate::model::signal::SignalEvent;
use crate::state::ChartSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OttParams {
    pub length: usize,
    pub percent: f64,
    /// Trailing bars searched for a crossover when deciding to alert.
    pub signal_lookback: usize,
}

impl Default for OttParams {
    fn default() -> Self {
        Self {
            length: 5,
            percent: 1.5,
            signal_lookback: 3,
        }
    }
}

impl From<&OttConfig> for OttParams {
    fn from(cfg: &OttConfig) -> Self {
        Self {
            length: cfg.length,
            percent: cfg.percent,
            signal_lookback: cfg.signal_lookback,
        }
    }
}

/// Result of running the indicator pipeline over one symbol's series.
#[derive(Debug, Clone)]
pub struct SymbolScan {
    pub symbol: String,
    pub series: PriceSeries,
    pub output: OttOutput,
    pub crossovers: Crossovers,
    /// Set when a crossover fired within the lookback window.
    pub signal: Option<SignalEvent>,
    pub error: Option<IndicatorError>,
}

/// Smooth, track and detect for one series.
///
/// Indicator failures degrade to an all-undefined output and no signal.
pub fn scan_series(symbol: &str, series: PriceSeries, params: OttParams) -> SymbolScan {
    let closes = series.closes();
    let (output, error) = match compute_indicators(&closes, params.length, params.percent) {
        Ok(output) => (output, None),
        Err(e) => {
            match &e {
                IndicatorError::InsufficientData { .. } => {
                    tracing::warn!(symbol, error = %e, "Insufficient data for OTT")
                }
                _ => tracing::error!(symbol, error = %e, "OTT computation failed"),
            }
            (OttOutput::undefined(closes.len()), Some(e))
        }
    };

    let crossovers = detect_signals(&output.mavg, &output.ott);
    let signal = crossovers
        .latest_within(params.signal_lookback)
        .and_then(|kind| {
            series.last().map(|last| SignalEvent {
                timestamp: last.timestamp,
                symbol: symbol.to_string(),
                kind,
                price: last.close,
            })
        });

    SymbolScan {
        symbol: symbol.to_string(),
        series,
        output,
        crossovers,
        signal,
        error,
    }
}

impl SymbolScan {
    pub fn chart(&self, updated_at: DateTime<Local>) -> ChartSnapshot {
        ChartSnapshot {
            symbol: self.symbol.clone(),
            timestamps: self.series.timestamps(),
            prices: self.series.points().iter().map(|p| p.close).collect(),
            mavg: self.output.mavg.clone(),
            ott: self.output.ott.clone(),
            direction: self.output.last_direction(),
            updated_at,
        }
    }
}
