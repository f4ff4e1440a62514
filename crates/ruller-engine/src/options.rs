//! 处理选项与组默认值

use crate::error::{Result, RullerError};
use crate::models::Input;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 请求级覆盖扁平化设置的输入字段
pub const FLATTEN_KEY: &str = "_flatten";
/// 请求级覆盖冲突策略的输入字段
pub const KEEP_FIRST_KEY: &str = "_keepFirst";
/// 请求级覆盖规则信息标注的输入字段
pub const RULE_INFO_OPTION_KEY: &str = "_info";

/// 规则处理选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// true 输出一个扁平 map；false 按规则层级输出嵌套的 `_items` 列表
    pub flatten_output: bool,
    /// 扁平模式下键冲突时，true 保留先合并的值，false 用后来的值覆盖
    pub merge_keep_first: bool,
    /// 扁平模式下为每条规则的输出标注来源规则名（`_rule`）
    pub add_rule_info: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            flatten_output: true,
            merge_keep_first: true,
            add_rule_info: false,
        }
    }
}

impl ProcessOptions {
    pub fn flatten(mut self, value: bool) -> Self {
        self.flatten_output = value;
        self
    }

    pub fn keep_first(mut self, value: bool) -> Self {
        self.merge_keep_first = value;
        self
    }

    pub fn rule_info(mut self, value: bool) -> Self {
        self.add_rule_info = value;
        self
    }
}

/// 组级默认选项
///
/// 每个选项只接受第一次设置，后续设置被忽略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupDefaults {
    flatten: Option<bool>,
    keep_first: Option<bool>,
}

impl GroupDefaults {
    /// 设置默认扁平化；返回是否生效
    pub fn set_flatten(&mut self, value: bool) -> bool {
        if self.flatten.is_some() {
            return false;
        }
        self.flatten = Some(value);
        true
    }

    /// 设置默认冲突策略；返回是否生效
    pub fn set_keep_first(&mut self, value: bool) -> bool {
        if self.keep_first.is_some() {
            return false;
        }
        self.keep_first = Some(value);
        true
    }

    pub fn flatten(&self) -> Option<bool> {
        self.flatten
    }

    pub fn keep_first(&self) -> Option<bool> {
        self.keep_first
    }

    /// 根据组默认值和请求输入中的覆盖字段计算本次处理选项
    ///
    /// 未设置时：层级输出、首个优先、标注规则信息。
    /// 覆盖字段 `_flatten` / `_keepFirst` / `_info` 存在时必须是布尔值。
    pub fn resolve(&self, input: &Input) -> Result<ProcessOptions> {
        Ok(ProcessOptions {
            flatten_output: bool_option(input, FLATTEN_KEY, self.flatten.unwrap_or(false))?,
            merge_keep_first: bool_option(
                input,
                KEEP_FIRST_KEY,
                self.keep_first.unwrap_or(true),
            )?,
            add_rule_info: bool_option(input, RULE_INFO_OPTION_KEY, true)?,
        })
    }
}

fn bool_option(input: &Input, key: &str, default: bool) -> Result<bool> {
    match input.get(key) {
        None => Ok(default),
        Some(Value::Bool(v)) => Ok(*v),
        Some(_) => Err(RullerError::InvalidOption {
            key: key.to_string(),
        }),
    }
}
