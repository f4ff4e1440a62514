//! 规则树评估器
//!
//! 深度优先遍历：每个节点先完整评估全部子节点，再以子树合并结果作为
//! `children_output` 调用自身规则。任何规则失败立即中止整个评估。

use crate::error::{Result, RullerError};
use crate::merge::{RULE_INFO_KEY, merge_into};
use crate::models::{Input, Output};
use crate::options::ProcessOptions;
use crate::rule::RuleContext;
use crate::tree::{Group, NodeId};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// 规则树评估器
pub struct TreeEvaluator<'a> {
    group: &'a Group,
    options: ProcessOptions,
}

impl<'a> TreeEvaluator<'a> {
    pub fn new(group: &'a Group, options: ProcessOptions) -> Self {
        Self { group, options }
    }

    /// 按注册顺序评估组内所有根规则并合并结果
    pub fn evaluate(&self, input: Arc<Input>) -> Result<Output> {
        self.evaluate_nodes(self.group.roots(), &input)
    }

    /// 评估同级节点，结果合并到同一个累加器
    fn evaluate_nodes(&self, ids: &[NodeId], input: &Arc<Input>) -> Result<Output> {
        let mut output = Output::new();
        for &id in ids {
            if let Some(contribution) = self.evaluate_node(id, input)? {
                merge_into(&mut output, contribution, &self.options);
            }
        }
        Ok(output)
    }

    /// 评估单个节点，返回该节点交给合并引擎的输出
    fn evaluate_node(&self, id: NodeId, input: &Arc<Input>) -> Result<Option<Output>> {
        let node = self.group.node(id);

        let children_output = if node.children().is_empty() {
            Output::new()
        } else {
            debug!(
                rule = node.name(),
                children = node.children().len(),
                "Processing children rules before parent"
            );
            // 子规则错误已经带有出错规则名，原样向上传播
            self.evaluate_nodes(node.children(), input)?
        };

        debug!(rule = node.name(), "Invoking rule");
        let ctx = RuleContext::new(Arc::clone(input), children_output);
        let mut output = match node.rule().evaluate(&ctx) {
            Ok(Some(output)) if !output.is_empty() => output,
            Ok(_) => {
                debug!(rule = node.name(), "Rule has no output");
                return Ok(None);
            }
            Err(source) => {
                return Err(RullerError::RuleExecution {
                    rule: node.name().to_string(),
                    source,
                });
            }
        };

        if self.options.add_rule_info && self.options.flatten_output {
            output.insert(
                RULE_INFO_KEY.to_string(),
                Value::String(node.name().to_string()),
            );
        }

        // 子规则输出覆盖父规则的同名键，与 merge_keep_first 无关
        for (key, value) in ctx.into_children_output() {
            output.insert(key, value);
        }

        Ok(Some(output))
    }
}
