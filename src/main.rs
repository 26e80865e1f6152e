use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ott_alert::config::{Config, LoggingConfig, NotifyConfig};
use ott_alert::dashboard::{self, DashboardContext};
use ott_alert::market_data::{PriceSource, YahooClient};
use ott_alert::monitor::{Monitor, MonitorSettings};
use ott_alert::notify::{LogNotifier, Notifier, WebhookNotifier};
use ott_alert::state::SharedState;

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    // JSON lines to the log file, human-readable output on stdout.
    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn build_notifier(notify: &NotifyConfig) -> Result<Option<Arc<dyn Notifier>>> {
    if !notify.enabled {
        return Ok(None);
    }
    match notify.webhook_url.as_deref() {
        Some(url) => Ok(Some(Arc::new(WebhookNotifier::new(url)?))),
        None => {
            tracing::warn!("Notifications enabled without OTT_WEBHOOK_URL, logging alerts only");
            Ok(Some(Arc::new(LogNotifier)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set OTT_CONFIG or provide config/default.toml");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging)?;

    let settings = Arc::new(MonitorSettings::from_config(&config));
    tracing::info!(
        symbols = ?settings.symbols,
        length = settings.params.length,
        percent = settings.params.percent,
        interval = %settings.interval,
        "Starting ott-alert"
    );

    let state = Arc::new(SharedState::new(config.alerts.limits()));
    let source: Arc<dyn PriceSource> = Arc::new(YahooClient::new(&config.market_data.base_url)?);
    let notifier = build_notifier(&config.notify)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = Monitor::new(source.clone(), notifier, state.clone(), settings.clone());
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx.clone()));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received");
        }
        let _ = shutdown_tx.send(true);
    });

    let listener = tokio::net::TcpListener::bind(&config.dashboard.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.dashboard.bind_addr))?;
    let app = dashboard::router(DashboardContext::new(state, source, settings));
    let mut server_shutdown = shutdown_rx;
    dashboard::serve(listener, app, async move {
        let _ = server_shutdown.changed().await;
    })
    .await?;

    if let Err(e) = monitor_task.await {
        tracing::error!(error = %e, "Monitor task panicked");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
