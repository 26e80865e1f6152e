use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::model::alert::AlertRecord;
use crate::model::signal::SignalKind;

/// Fully formatted alert ready for a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
    pub symbol: String,
    pub signal: SignalKind,
    pub price: f64,
    pub timestamp: DateTime<Local>,
}

impl AlertMessage {
    pub fn new(symbol: &str, signal: SignalKind, price: f64, timestamp: DateTime<Local>) -> Self {
        let subject = format!("OTT Alert: {} Signal for {}", signal, symbol);
        let body = format!(
            "OTT Strategy Alert\n\nSymbol: {}\nSignal: {}\nPrice: {:.2}\nTime: {}\n\nThis is an automated alert from the OTT monitor.\n",
            symbol,
            signal,
            price,
            timestamp.format("%Y-%m-%d %H:%M:%S"),
        );
        Self {
            subject,
            body,
            symbol: symbol.to_string(),
            signal,
            price,
            timestamp,
        }
    }

    pub fn from_record(record: &AlertRecord) -> Self {
        Self::new(&record.symbol, record.kind, record.price, record.timestamp)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, message: &AlertMessage) -> Result<()>;
}

/// Writes alerts to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        tracing::info!(
            symbol = %message.symbol,
            signal = %message.signal,
            price = message.price,
            subject = %message.subject,
            "Alert"
        );
        Ok(())
    }
}

/// POSTs each alert as JSON to a webhook.
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        self.http
            .post(&self.url)
            .json(message)
            .send()
            .await
            .context("webhook HTTP failed")?
            .error_for_status()
            .context("webhook returned error status")?;
        tracing::info!(symbol = %message.symbol, signal = %message.signal, "Webhook alert sent");
        Ok(())
    }
}
