#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ott_alert::market_data::PriceSource;
use ott_alert::model::price::{PricePoint, PriceSeries};
use ott_alert::monitor::MonitorSettings;
use ott_alert::notify::{AlertMessage, Notifier};
use ott_alert::pipeline::OttParams;

pub enum Reply {
    Closes(Vec<f64>),
    Empty,
    Fail,
}

/// In-memory price source keyed by symbol.
#[derive(Default)]
pub struct FakeSource {
    replies: HashMap<String, Reply>,
}

impl FakeSource {
    pub fn with(mut self, symbol: &str, reply: Reply) -> Self {
        self.replies.insert(symbol.to_string(), reply);
        self
    }
}

pub fn series(closes: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2026, 6, 15, 3, 45, 0).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, c)| PricePoint::new(start + chrono::Duration::minutes(30 * i as i64), *c))
        .collect();
    PriceSeries::new(points).unwrap()
}

#[async_trait]
impl PriceSource for FakeSource {
    async fn fetch(
        &self,
        symbol: &str,
        _range: &str,
        _interval: &str,
    ) -> Result<Option<PriceSeries>> {
        match self.replies.get(symbol) {
            Some(Reply::Closes(closes)) => Ok(Some(series(closes))),
            Some(Reply::Empty) | None => Ok(None),
            Some(Reply::Fail) => Err(anyhow::anyhow!("upstream unavailable")),
        }
    }
}

/// Notifier that remembers every message it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<AlertMessage>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Notifier whose transport is always down.
#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: Mutex<usize>,
}

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn notify(&self, _message: &AlertMessage) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(anyhow::anyhow!("smtp relay refused connection"))
    }
}

pub fn settings(symbols: &[&str]) -> Arc<MonitorSettings> {
    Arc::new(MonitorSettings {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        range: "5d".to_string(),
        interval: "30m".to_string(),
        min_points: 20,
        params: OttParams::default(),
        scan_interval: Duration::from_secs(3600),
        symbol_pause: Duration::ZERO,
        error_backoff: Duration::from_secs(3600),
    })
}

pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Rally then a 10-point-per-bar collapse; the sell fires at index 21.
pub fn reversal_ending_after_sell() -> Vec<f64> {
    let mut prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    prices.extend((1..=3).map(|j| 119.0 - 10.0 * j as f64));
    prices
}

/// Dip then climb; the buy fires at index 12.
pub fn dip_ending_after_buy() -> Vec<f64> {
    let mut prices: Vec<f64> = (0..8).map(|i| 110.0 - i as f64).collect();
    prices.extend((0..6).map(|i| 103.0 + 2.0 * i as f64));
    prices
}
