//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! recorder 安装后由 HTTP 层在 /metrics 渲染。

use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// 全局 Prometheus handle，recorder 只能安装一次
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 规则组评估耗时的直方图分桶（秒）
const RULE_DURATION_BUCKETS: &[f64] = &[0.001, 0.01, 0.1, 1.0, 10.0];

/// Prometheus 渲染句柄
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// 渲染 Prometheus 文本格式
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder
///
/// 重复调用返回第一次安装的 handle。
pub fn init(service_name: &str) -> Result<MetricsHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(MetricsHandle {
            handle: handle.clone(),
        });
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("_seconds".to_string()),
            RULE_DURATION_BUCKETS,
        )?
        .install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    Ok(MetricsHandle { handle })
}

/// 获取全局 Prometheus handle
pub fn get_handle() -> Option<MetricsHandle> {
    PROMETHEUS_HANDLE.get().map(|handle| MetricsHandle {
        handle: handle.clone(),
    })
}

/// 注册通用指标
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}
