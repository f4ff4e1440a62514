//! 规则定义
//!
//! 规则是由嵌入程序提供的不透明函数：读取请求输入和子树输出，返回部分输出。

use crate::models::{Input, Output};
use std::sync::Arc;

/// 规则执行上下文
///
/// `input` 在整个请求内共享；`children_output` 是当前节点子树合并后的结果，
/// 每个节点调用时单独创建，只对该节点的规则可见。
#[derive(Debug, Clone)]
pub struct RuleContext {
    input: Arc<Input>,
    children_output: Output,
}

impl RuleContext {
    pub fn new(input: Arc<Input>, children_output: Output) -> Self {
        Self {
            input,
            children_output,
        }
    }

    /// 请求输入
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// 子规则合并后的输出（叶子节点为空）
    pub fn children_output(&self) -> &Output {
        &self.children_output
    }

    pub(crate) fn into_children_output(self) -> Output {
        self.children_output
    }
}

/// 规则
///
/// 返回 `Ok(None)` 或空 map 表示该规则不贡献任何输出。
#[cfg_attr(test, mockall::automock)]
pub trait Rule: Send + Sync {
    fn evaluate(&self, ctx: &RuleContext) -> anyhow::Result<Option<Output>>;
}

/// 由闭包构造的规则，见 [`rule_fn`]
#[derive(Clone)]
pub struct FnRule<F> {
    f: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext) -> anyhow::Result<Option<Output>> + Send + Sync,
{
    fn evaluate(&self, ctx: &RuleContext) -> anyhow::Result<Option<Output>> {
        (self.f)(ctx)
    }
}

/// 将闭包包装为规则
///
/// ```
/// use ruller::{Output, rule_fn};
/// use serde_json::json;
///
/// let rule = rule_fn(|ctx| {
///     let mut output = Output::new();
///     output.insert("adult".into(), json!(ctx.input().get("age").and_then(|v| v.as_f64()) >= Some(18.0)));
///     Ok(Some(output))
/// });
/// # let _ = rule;
/// ```
pub fn rule_fn<F>(f: F) -> FnRule<F>
where
    F: Fn(&RuleContext) -> anyhow::Result<Option<Output>> + Send + Sync,
{
    FnRule { f }
}
