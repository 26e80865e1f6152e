mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use ott_alert::alert_history::HistoryLimits;
use ott_alert::dashboard::{self, DashboardContext};
use ott_alert::model::signal::SignalKind;
use ott_alert::state::SharedState;
use serde_json::Value;
use tokio::net::TcpListener;

use common::{FakeSource, Reply};

async fn spawn_dashboard(source: FakeSource) -> (SocketAddr, Arc<SharedState>) {
    let state = Arc::new(SharedState::new(HistoryLimits::default()));
    let ctx = DashboardContext::new(
        state.clone(),
        Arc::new(source),
        common::settings(&["^NSEI"]),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(dashboard::serve(
        listener,
        dashboard::router(ctx),
        std::future::pending::<()>(),
    ));
    (addr, state)
}

async fn get_json(addr: SocketAddr, path: &str) -> Value {
    reqwest::get(format!("http://{addr}{path}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
/// Verifies the index page and a fresh status payload.
async fn index_and_status() {
    let (addr, _) = spawn_dashboard(FakeSource::default()).await;

    let page = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("OTT Alert Dashboard"));

    let status = get_json(addr, "/api/status").await;
    assert_eq!(status["running"], Value::Bool(false));
    assert_eq!(status["alerts_today"], 0);
    assert!(status["last_scan"].is_null());
}

#[tokio::test]
/// Verifies alerts and recent signals are served newest first and clear empties them.
async fn alerts_signals_and_clear() {
    let (addr, state) = spawn_dashboard(FakeSource::default()).await;
    let now = Local::now();
    state
        .alerts()
        .record("^NSEI", SignalKind::Buy, 101.5, now)
        .unwrap();
    state
        .alerts()
        .record("^BSESN", SignalKind::Sell, 202.0, now)
        .unwrap();

    let alerts = get_json(addr, "/api/alerts").await;
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["symbol"], "^BSESN");
    assert_eq!(alerts[0]["signal"], "SELL");
    assert_eq!(alerts[1]["signal"], "BUY");

    let signals = get_json(addr, "/api/signals").await;
    assert_eq!(signals.as_array().unwrap().len(), 2);

    let status = get_json(addr, "/api/status").await;
    assert_eq!(status["alerts_today"], 2);

    let cleared: Value = reqwest::Client::new()
        .post(format!("http://{addr}/api/clear-alerts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["success"], Value::Bool(true));
    assert!(get_json(addr, "/api/alerts").await.as_array().unwrap().is_empty());
    assert_eq!(get_json(addr, "/api/status").await["alerts_today"], 0);
}

#[tokio::test]
/// Verifies a chart miss fetches on demand and caches the computed series.
async fn chart_fetches_on_demand() {
    let source = FakeSource::default().with("^NSEI", Reply::Closes(common::ramp(25)));
    let (addr, state) = spawn_dashboard(source).await;

    let chart = get_json(addr, "/api/chart/%5ENSEI").await;
    assert_eq!(chart["symbol"], "^NSEI");
    assert_eq!(chart["prices"].as_array().unwrap().len(), 25);
    assert_eq!(chart["ott"].as_array().unwrap().len(), 25);
    assert_eq!(chart["timestamps"].as_array().unwrap().len(), 25);
    assert!(state.chart("^NSEI").unwrap().is_some());

    let refreshed = get_json(addr, "/api/chart/%5ENSEI?refresh=true").await;
    assert_eq!(refreshed["prices"].as_array().unwrap().len(), 25);
}

#[tokio::test]
/// Verifies unknown and too-short symbols answer with an error object.
async fn chart_without_data_reports_error() {
    let source = FakeSource::default().with("TINY", Reply::Closes(common::ramp(5)));
    let (addr, _) = spawn_dashboard(source).await;

    let missing = get_json(addr, "/api/chart/UNKNOWN").await;
    assert_eq!(missing["error"], "No data available");

    let short = get_json(addr, "/api/chart/tiny").await;
    assert_eq!(short["error"], "No data available");
}
