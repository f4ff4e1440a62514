//! 规则服务 HTTP 集成测试

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use ruller::{Input, InputKind, Output, Registry, rule_fn};
use ruller_server::{AppState, ResponseFilter, routes, sample};
use serde_json::{Value, json};
use tower::ServiceExt;

/// 输入经过示例请求过滤器时，把输出包在 `{"a": ...}` 中返回
struct WrapMarked;

impl ResponseFilter for WrapMarked {
    fn filter(&self, input: &Input, output: &mut Output) -> anyhow::Result<Option<Response>> {
        if input.get("_something") != Some(&json!("test")) {
            return Ok(None);
        }
        let body = serde_json::to_vec(&json!({ "a": output }))?;
        Ok(Some(
            ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        ))
    }
}

fn create_test_app(registry: Registry) -> Router {
    routes::app(AppState::new(Arc::new(registry)), None)
}

fn sample_app() -> Router {
    create_test_app(sample::sample_registry().unwrap())
}

fn post_rules(group: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/rules/{group}"))
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn echo_remote_ip_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .add(
            "echo",
            "ip",
            rule_fn(|ctx| {
                let mut output = Output::new();
                output.insert("ip".into(), ctx.input()["_remote_ip"].clone());
                Ok(Some(output))
            }),
        )
        .unwrap();
    registry
}

#[tokio::test]
async fn test_filters_wrap_response() {
    let mut registry = Registry::new();
    registry.add_required_input("test", "age", InputKind::Number);
    registry.add_required_input("test", "children", InputKind::Bool);
    registry
        .add(
            "test",
            "rule1",
            rule_fn(|_| {
                let mut output = Output::new();
                output.insert("opt1".into(), json!("Some tests rule 1"));
                output.insert("rule1-opt2".into(), json!(129.99));
                output.insert("rule1".into(), json!(true));
                Ok(Some(output))
            }),
        )
        .unwrap();

    let state = AppState::new(Arc::new(registry))
        .with_request_filter(sample::mark_request)
        .with_response_filter(WrapMarked);
    let app = routes::app(state, None);

    let response = app
        .oneshot(post_rules(
            "test",
            json!({"age": 22, "children": false}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        &body[..],
        br#"{"a":{"_items":[{"opt1":"Some tests rule 1","rule1":true,"rule1-opt2":129.99}]}}"#
    );
}

#[tokio::test]
async fn test_sample_hierarchical_by_default() {
    let (status, json) = send(sample_app(), post_rules("test", r#"{"age": 30}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let items = json["_items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["rule1"], true);
    // 子规则输出以 _items 形式叠加在父规则输出上
    assert_eq!(items[0]["_items"][0]["rule1.1"], true);
    assert_eq!(items[1]["_items"][0]["category"], "young rule2.1");
    // 层级模式不写入 _rule
    assert!(items[0].get("_rule").is_none());
}

#[tokio::test]
async fn test_sample_flatten_override() {
    let body = json!({"age": 70, "_flatten": true, "_info": false}).to_string();
    let (status, json) = send(sample_app(), post_rules("test", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["opt1"], "Some tests rule 1");
    assert_eq!(json["category"], "elder rule2.1");
    assert_eq!(json["rule1.1"], true);
    assert_eq!(json["opt3"], "any3");
    assert!(json.get("_items").is_none());
    assert!(json.get("_rule").is_none());
}

#[tokio::test]
async fn test_sample_flatten_keep_last() {
    let body = json!({"age": 70, "_flatten": true, "_keepFirst": false}).to_string();
    let (status, json) = send(sample_app(), post_rules("test", body)).await;

    assert_eq!(status, StatusCode::OK);
    // rule2 的子树把 opt1 覆盖为 any1，最后合并的根规则胜出
    assert_eq!(json["opt1"], "any1");
}

#[tokio::test]
async fn test_group_default_flatten() {
    let mut registry = echo_remote_ip_registry();
    registry.set_default_flatten("echo", true);

    let (status, json) = send(create_test_app(registry), post_rules("echo", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"ip": "0.0.0.0", "_rule": "ip"}));
}

#[tokio::test]
async fn test_remote_ip_from_forwarded_header() {
    let mut request = post_rules("echo", "{}");
    request
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.7".parse().unwrap());

    let (status, json) = send(create_test_app(echo_remote_ip_registry()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["_items"][0]["ip"], "198.51.100.7");
}

#[tokio::test]
async fn test_invalid_option_returns_bad_request() {
    let body = json!({"age": 30, "_flatten": "yes"}).to_string();
    let (status, json) = send(sample_app(), post_rules("test", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_OPTION");
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_missing_required_input_returns_bad_request() {
    let (status, json) = send(sample_app(), post_rules("test", "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["message"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn test_invalid_json_returns_bad_request() {
    let (status, json) = send(sample_app(), post_rules("test", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_JSON");

    let (status, json) = send(sample_app(), post_rules("test", "[1, 2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_unknown_group_returns_not_found() {
    let (status, json) = send(sample_app(), post_rules("missing", "{}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "GROUP_NOT_FOUND");
}

#[tokio::test]
async fn test_rule_failure_returns_internal_error() {
    let mut registry = Registry::new();
    registry
        .add("broken", "boom", rule_fn(|_| Err(anyhow::anyhow!("exploded"))))
        .unwrap();

    let (status, json) = send(create_test_app(registry), post_rules("broken", "")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "RULE_EXECUTION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_request_filter_rejection() {
    let state = AppState::new(Arc::new(echo_remote_ip_registry())).with_request_filter(
        |_: &HeaderMap, _: &mut Input| -> anyhow::Result<()> { anyhow::bail!("blocked") },
    );

    let (status, json) = send(routes::app(state, None), post_rules("echo", "")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "FILTER_ERROR");
}

#[tokio::test]
async fn test_health_lists_groups() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(sample_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok", "groups": ["test"]}));
}

#[tokio::test]
async fn test_metrics_disabled_returns_not_found() {
    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(sample_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slow_rule_hits_request_timeout() {
    let mut registry = Registry::new();
    registry
        .add(
            "slow",
            "sleepy",
            rule_fn(|_| {
                std::thread::sleep(Duration::from_millis(1000));
                Ok(None)
            }),
        )
        .unwrap();

    let app = routes::app(
        AppState::new(Arc::new(registry)),
        Some(Duration::from_millis(50)),
    );

    let start = Instant::now();
    let response = app.oneshot(post_rules("slow", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(start.elapsed() < Duration::from_millis(900));
}
