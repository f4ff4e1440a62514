//! HTTP 处理器
//!
//! 规则组评估入口以及 /metrics、/health 端点。

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    body::to_bytes,
    extract::{ConnectInfo, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use ruller::Input;
use serde_json::{Value, json};
use tracing::{Span, debug, instrument};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 调用方 IP 写入输入时使用的键
pub const REMOTE_IP_KEY: &str = "_remote_ip";

const UNKNOWN_REMOTE_IP: &str = "0.0.0.0";

/// 评估一个规则组
///
/// POST /rules/{group}
///
/// 请求体为 JSON 对象，空请求体视为空输入。处理流程：
/// 1. 解析输入并写入 `_remote_ip`
/// 2. 根据组默认值和 `_flatten` / `_keepFirst` / `_info` 解析处理选项
/// 3. 执行请求过滤器
/// 4. 评估规则组
/// 5. 执行响应过滤器，过滤器可接管响应
#[instrument(skip_all, fields(group = %group))]
pub async fn handle_rule_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
    request: Request,
) -> Result<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::Body(e.to_string()))?;

    let mut input = parse_input(&bytes)?;
    input.insert(
        REMOTE_IP_KEY.to_string(),
        Value::String(remote_ip(&parts.headers, peer)),
    );
    debug!(input = ?input, "Parsed rules input");

    let options = state.registry.resolve_options(&group, &input)?;

    state
        .request_filter
        .filter(&parts.headers, &mut input)
        .map_err(ApiError::Filter)?;

    // 规则可能阻塞（如同步 I/O），放到阻塞线程池执行，超时层才能生效
    let registry = Arc::clone(&state.registry);
    let rules_input = input.clone();
    let span = Span::current();
    let mut output = tokio::task::spawn_blocking(move || {
        span.in_scope(|| registry.process(&group, rules_input, &options))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    if let Some(response) = state
        .response_filter
        .filter(&input, &mut output)
        .map_err(ApiError::Filter)?
    {
        return Ok(response);
    }

    Ok(Json(output).into_response())
}

/// 将请求体解析为输入，空请求体得到空输入
fn parse_input(bytes: &[u8]) -> Result<Input> {
    if bytes.is_empty() {
        return Ok(Input::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::InvalidJson(format!(
            "期望 JSON 对象，实际为 {}",
            ruller::models::type_name(&other)
        ))),
        Err(e) => Err(ApiError::InvalidJson(e.to_string())),
    }
}

/// 调用方 IP：优先 X-Forwarded-For，其次连接对端地址
pub fn remote_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_REMOTE_IP.to_string())
}

/// Prometheus 指标
///
/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// 存活探针
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "groups": state.registry.groups(),
    }))
}
