//! 规则引擎错误类型

use crate::models::InputKind;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RullerError {
    #[error("规则已存在: 组 '{group}' 中已注册规则 '{rule}'")]
    DuplicateRule { group: String, rule: String },

    #[error("父规则未找到: 组 '{group}' 中不存在规则 '{parent}' (注册 '{rule}' 时)")]
    ParentNotFound {
        group: String,
        rule: String,
        parent: String,
    },

    #[error("输入校验失败: {0}")]
    InvalidInput(ValidationErrors),

    #[error("规则组不存在: {0}")]
    UnknownGroup(String),

    #[error("规则 {rule} 执行失败: {source}")]
    RuleExecution {
        rule: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("处理选项 '{key}' 必须是布尔值")]
    InvalidOption { key: String },
}

pub type Result<T> = std::result::Result<T, RullerError>;

/// 单个字段的类型不匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMismatch {
    pub key: String,
    pub expected: InputKind,
    pub actual: &'static str,
}

/// 必需输入校验的汇总结果
///
/// 一次校验收集所有缺失字段和类型错误字段，调用方可以在一次往返中看到完整的问题列表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub missing: Vec<String>,
    pub mismatched: Vec<InputMismatch>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }

    pub fn is_missing(&self, key: &str) -> bool {
        self.missing.iter().any(|k| k == key)
    }

    pub fn is_mismatched(&self, key: &str) -> bool {
        self.mismatched.iter().any(|m| m.key == key)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(2);
        if !self.missing.is_empty() {
            parts.push(format!("缺少必需的输入字段: {}", self.missing.join(", ")));
        }
        if !self.mismatched.is_empty() {
            let details: Vec<String> = self
                .mismatched
                .iter()
                .map(|m| format!("{} 应为 {}, 实际为 {}", m.key, m.expected, m.actual))
                .collect();
            parts.push(format!("输入字段类型错误: {}", details.join("; ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}
