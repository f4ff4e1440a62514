//! 规则注册表
//!
//! 启动阶段通过 `&mut self` 注册规则、必需输入和组默认值，之后放入 `Arc`
//! 共享给所有请求只读使用，评估过程无需加锁。

use crate::error::{Result, RullerError};
use crate::evaluator::TreeEvaluator;
use crate::models::{Input, InputKind, Output};
use crate::options::{GroupDefaults, ProcessOptions};
use crate::rule::Rule;
use crate::telemetry;
use crate::tree::Group;
use crate::validator::RequiredInputs;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// 规则注册表
#[derive(Debug, Default)]
pub struct Registry {
    groups: HashMap<String, Group>,
    required: HashMap<String, RequiredInputs>,
    defaults: HashMap<String, GroupDefaults>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册根规则
    pub fn add(&mut self, group: &str, name: &str, rule: impl Rule + 'static) -> Result<()> {
        self.add_child(group, name, "", rule)
    }

    /// 注册规则，`parent` 为空字符串时作为根规则
    ///
    /// 同组内规则名必须唯一；父规则必须已经注册。注册失败不会修改注册表。
    pub fn add_child(
        &mut self,
        group: &str,
        name: &str,
        parent: &str,
        rule: impl Rule + 'static,
    ) -> Result<()> {
        debug!(group, rule = name, parent, "Adding rule");
        let parent = (!parent.is_empty()).then_some(parent);

        let inserted = match self.groups.get_mut(group) {
            Some(rules) => rules.insert(name, parent, Arc::new(rule)),
            None => {
                let mut rules = Group::new(group);
                let inserted = rules.insert(name, parent, Arc::new(rule));
                if inserted.is_ok() {
                    self.groups.insert(group.to_string(), rules);
                }
                inserted
            }
        };

        if let Err(e) = inserted {
            warn!(group, rule = name, error = %e, "Rule registration rejected");
            return Err(e);
        }

        telemetry::record_rule_registered(group);
        Ok(())
    }

    /// 声明组的必需输入字段，重复声明时覆盖期望类型
    pub fn add_required_input(&mut self, group: &str, key: &str, kind: InputKind) {
        debug!(group, key, %kind, "Adding required input");
        self.required
            .entry(group.to_string())
            .or_default()
            .insert(key, kind);
    }

    /// 设置组的默认输出扁平化，只有第一次调用生效
    pub fn set_default_flatten(&mut self, group: &str, value: bool) {
        if !self
            .defaults
            .entry(group.to_string())
            .or_default()
            .set_flatten(value)
        {
            debug!(group, value, "Default flatten already set, ignoring");
        }
    }

    /// 设置组的默认冲突策略，只有第一次调用生效
    pub fn set_default_keep_first(&mut self, group: &str, value: bool) {
        if !self
            .defaults
            .entry(group.to_string())
            .or_default()
            .set_keep_first(value)
        {
            debug!(group, value, "Default keep-first already set, ignoring");
        }
    }

    /// 组默认选项（未设置过的组返回空默认值）
    pub fn group_defaults(&self, group: &str) -> GroupDefaults {
        self.defaults.get(group).copied().unwrap_or_default()
    }

    /// 根据组默认值和请求中的 `_flatten` / `_keepFirst` / `_info` 覆盖字段计算处理选项
    pub fn resolve_options(&self, group: &str, input: &Input) -> Result<ProcessOptions> {
        self.group_defaults(group).resolve(input)
    }

    pub fn group(&self, group: &str) -> Option<&Group> {
        self.groups.get(group)
    }

    pub fn required_inputs(&self, group: &str) -> Option<&RequiredInputs> {
        self.required.get(group)
    }

    /// 已注册规则的组名（排序）
    pub fn groups(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.groups.get(group).is_some_and(|g| g.contains(name))
    }

    pub fn rule_count(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, Group::len)
    }

    /// 子规则名列表（按注册顺序）
    pub fn children_of(&self, group: &str, name: &str) -> Option<Vec<&str>> {
        self.groups.get(group)?.children_of(name)
    }

    /// 输出注册汇总日志
    pub fn log_summary(&self) {
        for name in self.groups() {
            info!(
                group = name,
                rules = self.rule_count(name),
                required_inputs = self.required.get(name).map_or(0, RequiredInputs::len),
                "Rule group registered"
            );
        }
    }

    /// 处理一个组的全部规则
    ///
    /// 1. 校验必需输入（收集全部违规，任何规则执行前失败）
    /// 2. 查找组
    /// 3. 深度优先评估规则森林并合并输出
    /// 4. 上报耗时和状态
    #[instrument(skip(self, input, options))]
    pub fn process(&self, group: &str, input: Input, options: &ProcessOptions) -> Result<Output> {
        debug!(?input, ?options, "Processing rules");

        if let Some(required) = self.required.get(group) {
            required.validate(&input).map_err(RullerError::InvalidInput)?;
        }

        let rules = self
            .groups
            .get(group)
            .ok_or_else(|| RullerError::UnknownGroup(group.to_string()))?;

        debug!(rules = rules.len(), "Invoking all rules from group");
        let start = Instant::now();
        let result = TreeEvaluator::new(rules, *options).evaluate(Arc::new(input));
        let status = if result.is_ok() {
            telemetry::STATUS_OK
        } else {
            telemetry::STATUS_ERROR
        };
        telemetry::record_group_evaluation(group, status, start.elapsed().as_secs_f64());

        result
    }
}
