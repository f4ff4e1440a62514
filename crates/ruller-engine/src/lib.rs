//! 分组规则引擎
//!
//! 提供按组注册、按树评估的规则处理能力，支持：
//! - 规则的父子层级注册（子规则先于父规则执行）
//! - 必需输入字段的类型校验
//! - 扁平 / 层级两种输出合并模式
//! - 首个优先 / 最后优先两种冲突策略

pub mod error;
pub mod evaluator;
pub mod merge;
pub mod models;
pub mod options;
pub mod registry;
pub mod rule;
pub mod telemetry;
pub mod tree;
pub mod validator;

pub use error::{InputMismatch, Result, RullerError, ValidationErrors};
pub use evaluator::TreeEvaluator;
pub use merge::{ITEMS_KEY, RULE_INFO_KEY, merge_into};
pub use models::{Input, InputKind, Output};
pub use options::{GroupDefaults, ProcessOptions};
pub use registry::Registry;
pub use rule::{FnRule, Rule, RuleContext, rule_fn};
pub use tree::{Group, NodeId, RuleNode};
pub use validator::RequiredInputs;
