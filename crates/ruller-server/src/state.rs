//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use ruller::Registry;
use ruller_shared::observability::metrics::MetricsHandle;

use crate::filters::{NoopFilter, RequestFilter, ResponseFilter};

/// Axum 应用共享状态
///
/// 规则注册表在启动阶段构建完成后只读，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub request_filter: Arc<dyn RequestFilter>,
    pub response_filter: Arc<dyn ResponseFilter>,
    /// Prometheus handle，未启用指标时为 None
    pub metrics: Option<MetricsHandle>,
}

impl AppState {
    /// 创建新的应用状态，过滤器默认不做处理
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            request_filter: Arc::new(NoopFilter),
            response_filter: Arc::new(NoopFilter),
            metrics: None,
        }
    }

    pub fn with_request_filter(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.request_filter = Arc::new(filter);
        self
    }

    pub fn with_response_filter(mut self, filter: impl ResponseFilter + 'static) -> Self {
        self.response_filter = Arc::new(filter);
        self
    }

    pub fn with_metrics(mut self, handle: Option<MetricsHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
