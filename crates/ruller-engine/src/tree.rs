//! 规则树
//!
//! 每个组把所有节点保存在一个 arena 中，父节点通过下标持有子节点，
//! 后注册的子节点对父节点立即可见。

use crate::error::{Result, RullerError};
use crate::rule::Rule;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 节点在组 arena 中的下标
pub type NodeId = usize;

/// 已注册的规则节点
pub struct RuleNode {
    name: String,
    parent: Option<String>,
    rule: Arc<dyn Rule>,
    children: Vec<NodeId>,
}

impl RuleNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 父规则名，根规则为 None
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// 按注册顺序排列的子节点
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl fmt::Debug for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// 规则组：一片按注册顺序排列的规则森林
#[derive(Debug)]
pub struct Group {
    name: String,
    nodes: Vec<RuleNode>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 插入规则节点
    ///
    /// `parent` 为 None 时作为根规则追加到根序列，否则追加到父节点的子序列。
    /// 失败时组保持不变。
    pub fn insert(
        &mut self,
        name: &str,
        parent: Option<&str>,
        rule: Arc<dyn Rule>,
    ) -> Result<NodeId> {
        if self.index.contains_key(name) {
            return Err(RullerError::DuplicateRule {
                group: self.name.clone(),
                rule: name.to_string(),
            });
        }

        let parent_id = match parent {
            Some(parent_name) => Some(self.index.get(parent_name).copied().ok_or_else(|| {
                RullerError::ParentNotFound {
                    group: self.name.clone(),
                    rule: name.to_string(),
                    parent: parent_name.to_string(),
                }
            })?),
            None => None,
        };

        let id = self.nodes.len();
        self.nodes.push(RuleNode {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            rule,
            children: Vec::new(),
        });
        self.index.insert(name.to_string(), id);

        match parent_id {
            Some(pid) => self.nodes[pid].children.push(id),
            None => self.roots.push(id),
        }

        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &RuleNode {
        &self.nodes[id]
    }

    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        self.index.get(name).map(|&id| &self.nodes[id])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按注册顺序排列的根节点
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 子规则名列表
    pub fn children_of(&self, name: &str) -> Option<Vec<&str>> {
        self.get(name).map(|node| {
            node.children
                .iter()
                .map(|&id| self.nodes[id].name.as_str())
                .collect()
        })
    }
}
