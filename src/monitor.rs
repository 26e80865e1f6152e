use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tokio::sync::watch;

use crate::alert_history::RecordOutcome;
use crate::config::Config;
use crate::market_data::PriceSource;
use crate::model::alert::AlertRecord;
use crate::notify::{AlertMessage, Notifier};
use crate::pipeline::{scan_series, OttParams, SymbolScan};
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub symbols: Vec<String>,
    pub range: String,
    pub interval: String,
    /// Series shorter than this are treated as no data.
    pub min_points: usize,
    pub params: OttParams,
    pub scan_interval: Duration,
    pub symbol_pause: Duration,
    pub error_backoff: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            symbols: config.monitor.symbols(),
            range: config.market_data.range.clone(),
            interval: config.market_data.interval.clone(),
            min_points: config.market_data.min_points,
            params: OttParams::from(&config.ott),
            scan_interval: config.monitor.scan_interval(),
            symbol_pause: config.monitor.symbol_pause(),
            error_backoff: config.monitor.error_backoff(),
        }
    }
}

/// Fetch a series and run the pipeline over it, caching the chart snapshot.
///
/// Returns `Ok(None)` when the source has no usable data.
pub async fn refresh_symbol(
    source: &dyn PriceSource,
    state: &SharedState,
    settings: &MonitorSettings,
    symbol: &str,
) -> Result<Option<SymbolScan>> {
    let Some(series) = source
        .fetch(symbol, &settings.range, &settings.interval)
        .await?
    else {
        tracing::warn!(symbol, "No data returned");
        return Ok(None);
    };
    if series.len() < settings.min_points {
        tracing::warn!(
            symbol,
            points = series.len(),
            min_points = settings.min_points,
            "Insufficient data"
        );
        return Ok(None);
    }

    let scan = scan_series(symbol, series, settings.params);
    state.store_chart(scan.chart(Local::now()))?;
    Ok(Some(scan))
}

/// Background scan loop: the only writer of alert history and status.
pub struct Monitor {
    source: Arc<dyn PriceSource>,
    notifier: Option<Arc<dyn Notifier>>,
    state: Arc<SharedState>,
    settings: Arc<MonitorSettings>,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn PriceSource>,
        notifier: Option<Arc<dyn Notifier>>,
        state: Arc<SharedState>,
        settings: Arc<MonitorSettings>,
    ) -> Self {
        Self {
            source,
            notifier,
            state,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Scan one symbol and record its signal. Returns the accepted alert, if any.
    pub async fn scan_symbol(&self, symbol: &str) -> Result<Option<AlertRecord>> {
        let Some(scan) =
            refresh_symbol(self.source.as_ref(), &self.state, &self.settings, symbol).await?
        else {
            return Ok(None);
        };
        let Some(event) = scan.signal else {
            tracing::debug!(symbol, direction = ?scan.output.last_direction(), "No recent signal");
            return Ok(None);
        };

        tracing::info!(symbol, signal = %event.kind, price = event.price, "Signal detected");
        let outcome = self
            .state
            .alerts()
            .record(&event.symbol, event.kind, event.price, Local::now())?;
        let RecordOutcome::Accepted(record) = outcome else {
            return Ok(None);
        };

        if let Some(notifier) = &self.notifier {
            let message = AlertMessage::from_record(&record);
            if let Err(e) = notifier.notify(&message).await {
                tracing::error!(
                    symbol,
                    notifier = notifier.name(),
                    error = %e,
                    "Alert delivery failed"
                );
            }
        }
        Ok(Some(record))
    }

    /// One pass over the watchlist. Per-symbol failures are logged and skipped.
    pub async fn run_cycle(&self) -> Result<usize> {
        tracing::info!(symbols = self.settings.symbols.len(), "Starting scan");
        self.state.mark_scan(Local::now())?;

        let mut alerts = 0usize;
        for (i, symbol) in self.settings.symbols.iter().enumerate() {
            if i > 0 && !self.settings.symbol_pause.is_zero() {
                tokio::time::sleep(self.settings.symbol_pause).await;
            }
            match self.scan_symbol(symbol).await {
                Ok(Some(_)) => alerts += 1,
                Ok(None) => {}
                Err(e) => tracing::error!(symbol = %symbol, error = %e, "Error processing symbol"),
            }
        }

        tracing::info!(alerts, "Scan completed");
        Ok(alerts)
    }

    /// Run cycles until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.state.set_running(true) {
            tracing::error!(error = %e, "Failed to mark monitor running");
        }
        tracing::info!("Starting OTT monitoring");

        while !*shutdown.borrow() {
            let wait = match self.run_cycle().await {
                Ok(_) => self.settings.scan_interval,
                Err(e) => {
                    tracing::error!(error = %e, "Scan cycle failed");
                    self.settings.error_backoff
                }
            };
            tracing::debug!(secs = wait.as_secs(), "Sleeping until next scan");
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.state.set_running(false) {
            tracing::error!(error = %e, "Failed to mark monitor stopped");
        }
        tracing::info!("Monitor shutting down");
    }
}
