use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::AppError;
use crate::model::price::PriceSeries;

use super::PriceSource;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ott-alert";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

/// Client for the Yahoo Finance v8 chart endpoint.
pub struct YahooClient {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid base url '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base url '{}' cannot carry a path", base_url);
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build market data HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn chart_url(&self, symbol: &str, range: &str, interval: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval);
        url
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Option<PriceSeries>> {
        let url = self.chart_url(symbol, range, interval);
        tracing::debug!(symbol, %url, "Fetching chart");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("chart request HTTP failed")?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(symbol, "Chart endpoint reports unknown symbol");
            return Ok(None);
        }
        let body = resp
            .error_for_status()
            .context("chart request returned error status")?
            .text()
            .await
            .context("chart response body read failed")?;

        Ok(parse_chart(symbol, &body)?)
    }
}

/// Parse a chart response body. Rows with a null close are dropped.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Option<PriceSeries>, AppError> {
    let root: ChartResponse = serde_json::from_str(body)?;
    if let Some(err) = root.chart.error {
        return Err(AppError::MarketData {
            symbol: symbol.to_string(),
            msg: format!("{}: {}", err.code, err.description),
        });
    }

    let Some(result) = root.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(None);
    };
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();
    if result.timestamp.is_empty() || closes.is_empty() {
        return Ok(None);
    }

    let timestamps = result
        .timestamp
        .iter()
        .map(|secs| {
            Utc.timestamp_opt(*secs, 0)
                .single()
                .ok_or_else(|| AppError::MarketData {
                    symbol: symbol.to_string(),
                    msg: format!("invalid timestamp {}", secs),
                })
        })
        .collect::<Result<Vec<DateTime<Utc>>, AppError>>()?;

    let series = PriceSeries::from_columns(&timestamps, &closes)?;
    if series.is_empty() {
        return Ok(None);
    }
    Ok(Some(series))
}
