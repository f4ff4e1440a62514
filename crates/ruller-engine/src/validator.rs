//! 必需输入校验
//!
//! 在任何规则执行之前检查一次，收集全部违规后统一报告。

use crate::error::{InputMismatch, ValidationErrors};
use crate::models::{Input, InputKind, type_name};
use std::collections::BTreeMap;
use tracing::debug;

/// 某个组声明的必需输入字段
#[derive(Debug, Clone, Default)]
pub struct RequiredInputs {
    fields: BTreeMap<String, InputKind>,
}

impl RequiredInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明必需字段，重复声明时覆盖期望类型
    pub fn insert(&mut self, key: impl Into<String>, kind: InputKind) {
        self.fields.insert(key.into(), kind);
    }

    pub fn get(&self, key: &str) -> Option<InputKind> {
        self.fields.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 校验输入
    ///
    /// 缺失字段和类型错误字段都会被收集，按字段名排序。
    pub fn validate(&self, input: &Input) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (key, kind) in &self.fields {
            match input.get(key) {
                None => errors.missing.push(key.clone()),
                Some(value) if !kind.matches(value) => errors.mismatched.push(InputMismatch {
                    key: key.clone(),
                    expected: *kind,
                    actual: type_name(value),
                }),
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(%errors, "Required input validation failed");
            Err(errors)
        }
    }
}
