//! 路由配置模块

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use ruller_shared::observability::middleware::http_tracing;
use tower_http::timeout::TimeoutLayer;

use crate::{handlers, state::AppState};

/// 规则评估路由
pub fn rule_routes() -> Router<AppState> {
    Router::new().route("/rules/{group}", post(handlers::handle_rule_group))
}

/// 构建完整的应用路由
///
/// `request_timeout` 为 None 时不限制单个请求的处理时间
pub fn app(state: AppState, request_timeout: Option<Duration>) -> Router {
    let router = Router::new()
        .merge(rule_routes())
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health));

    let router = match request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        )),
        None => router,
    };

    router
        .layer(middleware::from_fn(http_tracing))
        .with_state(state)
}
