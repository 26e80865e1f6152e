//! HTTP dashboard: a static page plus a small JSON API over `SharedState`.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::market_data::PriceSource;
use crate::model::alert::AlertRecord;
use crate::monitor::{refresh_symbol, MonitorSettings};
use crate::state::{ChartSnapshot, SharedState, StatusView};

const INDEX_HTML: &str = include_str!("index.html");
const RECENT_SIGNAL_HOURS: i64 = 24;
const RECENT_SIGNAL_LIMIT: usize = 20;

#[derive(Clone)]
pub struct DashboardContext {
    state: Arc<SharedState>,
    source: Arc<dyn PriceSource>,
    settings: Arc<MonitorSettings>,
}

impl DashboardContext {
    pub fn new(
        state: Arc<SharedState>,
        source: Arc<dyn PriceSource>,
        settings: Arc<MonitorSettings>,
    ) -> Self {
        Self {
            state,
            source,
            settings,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %e, "Dashboard request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn router(ctx: DashboardContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(api_status))
        .route("/api/alerts", get(api_alerts))
        .route("/api/signals", get(api_signals))
        .route("/api/chart/{symbol}", get(api_chart))
        .route("/api/clear-alerts", post(api_clear_alerts))
        .with_state(ctx)
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    tracing::info!("Dashboard listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("dashboard server failed")
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn api_status(State(ctx): State<DashboardContext>) -> ApiResult<StatusView> {
    ctx.state.status_view().map(Json).map_err(internal)
}

async fn api_alerts(State(ctx): State<DashboardContext>) -> ApiResult<Vec<AlertRecord>> {
    ctx.state.alerts().snapshot().map(Json).map_err(internal)
}

async fn api_signals(State(ctx): State<DashboardContext>) -> ApiResult<Vec<AlertRecord>> {
    ctx.state
        .alerts()
        .recent(
            Local::now(),
            Duration::hours(RECENT_SIGNAL_HOURS),
            RECENT_SIGNAL_LIMIT,
        )
        .map(Json)
        .map_err(internal)
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct ChartPayload {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    pub ott: Vec<Option<f64>>,
}

impl From<ChartSnapshot> for ChartPayload {
    fn from(chart: ChartSnapshot) -> Self {
        Self {
            symbol: chart.symbol,
            timestamps: chart.timestamps,
            prices: chart.prices,
            ott: chart.ott,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChartReply {
    Chart(ChartPayload),
    Error { error: String },
}

async fn api_chart(
    State(ctx): State<DashboardContext>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Json<ChartReply> {
    let symbol = symbol.trim().to_ascii_uppercase();
    Json(match chart_for(&ctx, &symbol, query.refresh).await {
        Ok(Some(chart)) => ChartReply::Chart(chart),
        Ok(None) => ChartReply::Error {
            error: "No data available".to_string(),
        },
        Err(e) => {
            tracing::error!(symbol = %symbol, error = %e, "Chart API error");
            ChartReply::Error {
                error: e.to_string(),
            }
        }
    })
}

async fn chart_for(
    ctx: &DashboardContext,
    symbol: &str,
    refresh: bool,
) -> Result<Option<ChartPayload>> {
    if !refresh {
        if let Some(cached) = ctx.state.chart(symbol)? {
            return Ok(Some(cached.into()));
        }
    }

    let scan = refresh_symbol(ctx.source.as_ref(), &ctx.state, &ctx.settings, symbol).await?;
    Ok(scan.map(|scan| scan.chart(Local::now()).into()))
}

#[derive(Debug, Serialize)]
struct ClearReply {
    success: bool,
}

async fn api_clear_alerts(State(ctx): State<DashboardContext>) -> ApiResult<ClearReply> {
    ctx.state.alerts().clear().map_err(internal)?;
    tracing::info!("Alert history cleared from dashboard");
    Ok(Json(ClearReply { success: true }))
}
