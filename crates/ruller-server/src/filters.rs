//! 请求 / 响应过滤器
//!
//! 请求过滤器在规则处理前执行，可以补充或修改输入；
//! 响应过滤器在规则处理后执行，可以修改输出或完全接管响应。

use axum::http::HeaderMap;
use axum::response::Response;
use ruller::{Input, Output};

/// 请求过滤器，返回错误时请求以 500 结束
pub trait RequestFilter: Send + Sync {
    fn filter(&self, headers: &HeaderMap, input: &mut Input) -> anyhow::Result<()>;
}

/// 响应过滤器
///
/// 返回 `Some(response)` 时直接使用该响应，不再输出默认的 JSON。
pub trait ResponseFilter: Send + Sync {
    fn filter(&self, input: &Input, output: &mut Output) -> anyhow::Result<Option<Response>>;
}

/// 不做任何处理的过滤器
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl RequestFilter for NoopFilter {
    fn filter(&self, _headers: &HeaderMap, _input: &mut Input) -> anyhow::Result<()> {
        Ok(())
    }
}

impl ResponseFilter for NoopFilter {
    fn filter(&self, _input: &Input, _output: &mut Output) -> anyhow::Result<Option<Response>> {
        Ok(None)
    }
}

impl<F> RequestFilter for F
where
    F: Fn(&HeaderMap, &mut Input) -> anyhow::Result<()> + Send + Sync,
{
    fn filter(&self, headers: &HeaderMap, input: &mut Input) -> anyhow::Result<()> {
        self(headers, input)
    }
}
