//! 示例规则服务
//!
//! 注册示例规则森林并通过 HTTP 提供评估。

use std::sync::Arc;

use ruller_server::{sample, server, state::AppState};
use ruller_shared::{config::AppConfig, observability};
use tracing::info;

const SERVICE_NAME: &str = "ruller-sample";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let guard = observability::init(&config.service_name, &config.observability)?;
    ruller::telemetry::describe();

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let registry = sample::sample_registry()?;
    registry.log_summary();

    let state = AppState::new(Arc::new(registry))
        .with_request_filter(sample::mark_request)
        .with_metrics(guard.metrics_handle());

    server::serve(&config, state).await
}
