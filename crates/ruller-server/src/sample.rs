//! 示例规则森林
//!
//! ruller-sample 启动时注册的演示规则，也供 HTTP 测试使用。

use anyhow::{Context, anyhow};
use axum::http::HeaderMap;
use ruller::{Input, InputKind, Output, Registry, Result, rule_fn};
use serde_json::{Value, json};

/// 示例规则组名
pub const SAMPLE_GROUP: &str = "test";

/// rule2.2 下的分支数量
const RULE22_BRANCHES: usize = 10;

fn output_of(pairs: &[(&str, Value)]) -> Output {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// 注册示例规则
///
/// ```text
/// rule1 ── rule1.1
/// rule2 ─┬ rule2.1
///        └ rule2.2 ── rule2.2-{a} ── rule2.2-{a}-0 ── rule2.2-{a}-0-0
/// ```
pub fn register_sample_rules(registry: &mut Registry) -> Result<()> {
    registry.add_required_input(SAMPLE_GROUP, "age", InputKind::Number);

    registry.add(
        SAMPLE_GROUP,
        "rule1",
        rule_fn(|ctx| {
            let mut output = output_of(&[
                ("opt1", json!("Some tests rule 1")),
                ("rule1-opt2", json!(129.99)),
            ]);
            if ctx.input().get("menu") == Some(&Value::Bool(true)) {
                output.insert(
                    "menu".into(),
                    json!({
                        "rule1-c1": "123",
                        "rule1-c2": format!("v{}", rand::random::<u32>()),
                    }),
                );
            }
            output.insert("rule1".into(), json!(true));
            Ok(Some(output))
        }),
    )?;

    registry.add_child(
        SAMPLE_GROUP,
        "rule1.1",
        "rule1",
        rule_fn(|_| {
            Ok(Some(output_of(&[
                ("rule1.1-mydata", json!("myvalue")),
                ("rule1.1", json!(true)),
            ])))
        }),
    )?;

    registry.add(
        SAMPLE_GROUP,
        "rule2",
        rule_fn(|_| {
            Ok(Some(output_of(&[
                ("opt1", json!("Lots of tests rule 2")),
                ("rule2", json!(true)),
            ])))
        }),
    )?;

    registry.add_child(
        SAMPLE_GROUP,
        "rule2.1",
        "rule2",
        rule_fn(|ctx| {
            let age = ctx
                .input()
                .get("age")
                .and_then(Value::as_f64)
                .ok_or_else(|| anyhow!("invalid 'age' detected: {:?}", ctx.input().get("age")))?;
            let category = if age > 60.0 {
                "elder rule2.1"
            } else {
                "young rule2.1"
            };
            Ok(Some(output_of(&[
                ("category", json!(category)),
                ("rule2.1", json!(true)),
            ])))
        }),
    )?;

    registry.add_child(
        SAMPLE_GROUP,
        "rule2.2",
        "rule2",
        rule_fn(|_| {
            Ok(Some(output_of(&[
                ("rule2.2-type", json!("any")),
                ("rule2.2", json!(true)),
            ])))
        }),
    )?;

    for a in 0..RULE22_BRANCHES {
        let branch = format!("rule2.2-{a}");
        let leaf = format!("{branch}-0");
        let deepest = format!("{leaf}-0");

        registry.add_child(
            SAMPLE_GROUP,
            &branch,
            "rule2.2",
            rule_fn(|_| Ok(Some(output_of(&[("opt1", json!("any1"))])))),
        )?;
        registry.add_child(
            SAMPLE_GROUP,
            &leaf,
            &branch,
            rule_fn(|_| Ok(Some(output_of(&[("opt2", json!("any2"))])))),
        )?;
        registry.add_child(
            SAMPLE_GROUP,
            &deepest,
            &leaf,
            rule_fn(|_| Ok(Some(output_of(&[("opt3", json!("any3"))])))),
        )?;
    }

    Ok(())
}

/// 示例请求过滤器：标记经过过滤的请求
pub fn mark_request(_headers: &HeaderMap, input: &mut Input) -> anyhow::Result<()> {
    input.insert("_something".into(), json!("test"));
    Ok(())
}

/// 构建只读的示例注册表
pub fn sample_registry() -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    register_sample_rules(&mut registry).context("注册示例规则失败")?;
    Ok(registry)
}
