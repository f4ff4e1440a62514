//! 规则引擎领域模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 请求输入：请求级别共享、只读
pub type Input = Map<String, Value>;

/// 规则输出（以及合并后的组输出）
pub type Output = Map<String, Value>;

/// 必需输入字段的期望类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    String,
    Number,
    Bool,
}

impl InputKind {
    /// 判断运行时值是否符合期望类型（任意 JSON 数字都视为 number）
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
        };
        write!(f, "{}", s)
    }
}

/// 获取值的类型名称（用于错误信息）
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
