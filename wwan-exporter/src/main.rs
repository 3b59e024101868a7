// WWAN Exporter - Prometheus exporter for Huawei LTE/5G routers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # WWAN Exporter
//!
//! Prometheus exporter for the radio, traffic and notification state of a
//! Huawei LTE/5G router.
//!
//! ## Usage
//!
//! ```bash
//! # config.ini in the working directory
//! cat > config.ini <<EOF
//! [DEFAULT]
//! ROUTER_ADDRESS = 192.168.8.1
//! ROUTER_USER = admin
//! ROUTER_PASS = secret
//! PROM_PORT = 9107
//! EOF
//! wwan-exporter
//!
//! # or entirely from the environment
//! ROUTER_ADDRESS=192.168.8.1 ROUTER_USER=admin ROUTER_PASS=secret PROM_PORT=9107 wwan-exporter
//! ```

mod error;
mod huawei;
mod metrics;
mod xml;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use error::Result;
use huawei::HuaweiClient;
use metrics::{content_type, encode_observations};
use serde::Serialize;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wwan::{Collector, DeviceClient, FetchCache, Settings};

/// Application state shared across handlers.
struct AppState {
    collector: Collector<HuaweiClient>,
    start_time: Instant,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("WWAN Exporter v{}", env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let settings = Settings::load()?;
    huawei::describe(&settings);

    // The blocking HTTP client must be built and dropped outside the runtime.
    let client = HuaweiClient::new(&settings)?;
    let cache = Arc::new(FetchCache::with_min_interval(client, settings.fetch_interval));
    let collector = Collector::new(cache);

    info!("Initializing and first fetch");
    collector.cache().ensure_fresh();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(settings.listen_addr(), collector.clone()))
}

async fn serve(addr: SocketAddr, collector: Collector<HuaweiClient>) -> Result<()> {
    let state = Arc::new(AppState {
        collector,
        start_time: Instant::now(),
    });

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>WWAN Exporter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .endpoints { background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>WWAN Exporter</h1>
    <p>Prometheus exporter for Huawei LTE/5G routers.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/status">/status</a> - Status information (JSON)</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>wwan_signal_*</code> - LTE/UMTS radio values</li>
        <li><code>wwan_nr_signal_*</code> - 5G NR radio values</li>
        <li><code>wwan_traffic_stats_*</code> - Connection time and volume</li>
        <li><code>wwan_notifications_*</code> - SMS state</li>
        <li><code>wwan_router_*</code>, <code>wwan_device_info</code> - Device identity and uptime</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
///
/// The collector may block on the router, so it runs off the async workers.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let collector = state.collector.clone();
    let encoded = tokio::task::spawn_blocking(move || {
        let assembly = collector.collect();
        encode_observations(&assembly.observations)
    })
    .await;

    match encoded {
        Ok(Ok(body)) => (StatusCode::OK, [(CONTENT_TYPE, content_type())], body).into_response(),
        Ok(Err(e)) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!("Scrape task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    fetch_interval_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_fetch_age_secs: Option<f64>,
    consecutive_failures: u64,
    scrapes: u64,
    snapshot: SnapshotStatus,
}

/// Number of fields held per record group.
#[derive(Serialize)]
struct SnapshotStatus {
    signal: usize,
    traffic_statistics: usize,
    notifications: usize,
    device_information: usize,
}

impl StatusResponse {
    fn new<C: DeviceClient>(collector: &Collector<C>, uptime_secs: u64) -> Self {
        let cache = collector.cache();
        let snapshot = cache.snapshot();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
            fetch_interval_secs: cache.min_interval().as_secs_f64(),
            last_fetch_age_secs: cache.last_fetch().map(|t| t.elapsed().as_secs_f64()),
            consecutive_failures: cache.consecutive_failures(),
            scrapes: collector.scrapes(),
            snapshot: SnapshotStatus {
                signal: snapshot.signal.len(),
                traffic_statistics: snapshot.traffic_statistics.len(),
                notifications: snapshot.notifications.len(),
                device_information: snapshot.device_information.len(),
            },
        }
    }
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Response {
    let uptime_secs = state.start_time.elapsed().as_secs();
    let collector = state.collector.clone();
    let status =
        tokio::task::spawn_blocking(move || StatusResponse::new(&collector, uptime_secs)).await;

    match status {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            error!("Status task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wwan::{DeviceError, Record};

    struct OfflineRouter;

    impl DeviceClient for OfflineRouter {
        fn signal(&mut self) -> std::result::Result<Record, DeviceError> {
            Err(DeviceError::Connection("refused".to_string()))
        }

        fn traffic_statistics(&mut self) -> std::result::Result<Record, DeviceError> {
            Err(DeviceError::Connection("refused".to_string()))
        }

        fn notifications(&mut self) -> std::result::Result<Record, DeviceError> {
            Err(DeviceError::Connection("refused".to_string()))
        }

        fn device_information(&mut self) -> std::result::Result<Record, DeviceError> {
            Err(DeviceError::Connection("refused".to_string()))
        }
    }

    #[test]
    fn test_status_json_before_first_fetch() {
        let cache = Arc::new(FetchCache::with_min_interval(OfflineRouter, Duration::from_secs(4)));
        let collector = Collector::new(cache);
        collector.collect();

        let json = serde_json::to_value(StatusResponse::new(&collector, 42)).unwrap();
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["uptime_secs"], 42);
        assert_eq!(json["fetch_interval_secs"], 4.0);
        assert_eq!(json["consecutive_failures"], 1);
        assert_eq!(json["scrapes"], 1);
        assert_eq!(json["snapshot"]["signal"], 0);
        assert!(json.get("last_fetch_age_secs").is_none());
    }
}
