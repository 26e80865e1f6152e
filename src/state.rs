use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::alert_history::{AlertHistory, HistoryLimits};
use crate::indicator::Direction;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub last_scan: Option<DateTime<Local>>,
}

/// Status as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub running: bool,
    pub last_scan: Option<DateTime<Local>>,
    pub alerts_today: usize,
}

/// Latest computed series for one symbol, kept for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    pub mavg: Vec<Option<f64>>,
    pub ott: Vec<Option<f64>>,
    pub direction: Option<Direction>,
    pub updated_at: DateTime<Local>,
}

/// State shared by the monitor task (single writer) and dashboard readers.
#[derive(Debug, Default)]
pub struct SharedState {
    alerts: AlertHistory,
    status: RwLock<MonitorStatus>,
    charts: RwLock<HashMap<String, ChartSnapshot>>,
}

impl SharedState {
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            alerts: AlertHistory::new(limits),
            status: RwLock::new(MonitorStatus::default()),
            charts: RwLock::new(HashMap::new()),
        }
    }

    pub fn alerts(&self) -> &AlertHistory {
        &self.alerts
    }

    pub fn status(&self) -> Result<MonitorStatus> {
        let guard = self
            .status
            .read()
            .map_err(|_| anyhow::anyhow!("monitor status lock poisoned"))?;
        Ok(guard.clone())
    }

    pub fn status_view(&self) -> Result<StatusView> {
        let status = self.status()?;
        Ok(StatusView {
            running: status.running,
            last_scan: status.last_scan,
            alerts_today: self.alerts.alerts_today()?,
        })
    }

    pub fn set_running(&self, running: bool) -> Result<()> {
        let mut guard = self
            .status
            .write()
            .map_err(|_| anyhow::anyhow!("monitor status lock poisoned"))?;
        guard.running = running;
        Ok(())
    }

    pub fn mark_scan(&self, at: DateTime<Local>) -> Result<()> {
        let mut guard = self
            .status
            .write()
            .map_err(|_| anyhow::anyhow!("monitor status lock poisoned"))?;
        guard.last_scan = Some(at);
        Ok(())
    }

    pub fn store_chart(&self, snapshot: ChartSnapshot) -> Result<()> {
        let mut guard = self
            .charts
            .write()
            .map_err(|_| anyhow::anyhow!("chart cache lock poisoned"))?;
        guard.insert(snapshot.symbol.clone(), snapshot);
        Ok(())
    }

    pub fn chart(&self, symbol: &str) -> Result<Option<ChartSnapshot>> {
        let guard = self
            .charts
            .read()
            .map_err(|_| anyhow::anyhow!("chart cache lock poisoned"))?;
        Ok(guard.get(symbol).cloned())
    }
}
