//! 规则服务 HTTP 层
//!
//! 将规则注册表暴露为 REST API：`POST /rules/{group}` 评估规则组，
//! 另提供 `/metrics` 和 `/health`。

pub mod error;
pub mod filters;
pub mod handlers;
pub mod routes;
pub mod sample;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use filters::{NoopFilter, RequestFilter, ResponseFilter};
pub use state::AppState;
