//! HTTP 层错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ruller::RullerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("读取请求体失败: {0}")]
    Body(String),

    #[error("无效的输入 JSON: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Rules(#[from] RullerError),

    #[error("过滤器处理失败: {0}")]
    Filter(#[source] anyhow::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Body(_) | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Rules(e) => match e {
                RullerError::InvalidInput(_) | RullerError::InvalidOption { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RullerError::UnknownGroup(_) => StatusCode::NOT_FOUND,
                RullerError::DuplicateRule { .. }
                | RullerError::ParentNotFound { .. }
                | RullerError::RuleExecution { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Filter(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Body(_) => "INVALID_BODY",
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::Rules(e) => match e {
                RullerError::InvalidInput(_) => "INVALID_INPUT",
                RullerError::InvalidOption { .. } => "INVALID_OPTION",
                RullerError::UnknownGroup(_) => "GROUP_NOT_FOUND",
                RullerError::DuplicateRule { .. } | RullerError::ParentNotFound { .. } => {
                    "REGISTRATION_ERROR"
                }
                RullerError::RuleExecution { .. } => "RULE_EXECUTION_ERROR",
            },
            Self::Filter(_) => "FILTER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::warn!(error = %self, "Error processing rules");
        } else {
            tracing::debug!(error = %self, "Rejected rules request");
        }

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": format!("Error processing rules: {}", self),
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ruller::ValidationErrors;

    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::Body("eof".into()), StatusCode::BAD_REQUEST, "INVALID_BODY"),
            (ApiError::InvalidJson("expected value".into()), StatusCode::BAD_REQUEST, "INVALID_JSON"),
            (
                ApiError::Rules(RullerError::InvalidInput(ValidationErrors::default())),
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
            ),
            (
                ApiError::Rules(RullerError::InvalidOption { key: "_flatten".into() }),
                StatusCode::BAD_REQUEST,
                "INVALID_OPTION",
            ),
            (
                ApiError::Rules(RullerError::UnknownGroup("nope".into())),
                StatusCode::NOT_FOUND,
                "GROUP_NOT_FOUND",
            ),
            (
                ApiError::Rules(RullerError::RuleExecution {
                    rule: "rule1".into(),
                    source: anyhow::anyhow!("boom"),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
                "RULE_EXECUTION_ERROR",
            ),
            (
                ApiError::Filter(anyhow::anyhow!("denied")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "FILTER_ERROR",
            ),
            (
                ApiError::Internal("task panicked".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ]
    }

    #[test]
    fn test_error_status_and_codes() {
        for (err, status, code) in all_error_variants() {
            assert_eq!(err.status_code(), status, "{:?}", err);
            assert_eq!(err.error_code(), code, "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response =
            ApiError::Rules(RullerError::UnknownGroup("nope".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "GROUP_NOT_FOUND");
        assert!(json["message"].as_str().unwrap().contains("nope"));
    }
}
