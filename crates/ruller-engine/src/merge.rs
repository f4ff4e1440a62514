//! 输出合并
//!
//! 把单条规则（已叠加子规则输出）的结果合并进当前层级的累加器。

use crate::models::Output;
use crate::options::ProcessOptions;
use serde_json::Value;
use tracing::debug;

/// 层级模式下保存同级规则输出的保留键
pub const ITEMS_KEY: &str = "_items";
/// 扁平模式下标注来源规则名的键
pub const RULE_INFO_KEY: &str = "_rule";

/// 合并规则输出到累加器
///
/// - 扁平模式：逐键合并，冲突时由 `merge_keep_first` 决定保留旧值还是覆盖
/// - 层级模式：整个 `source` 作为一个元素追加到 `_items` 列表
///
/// 空的 `source` 不产生任何变化，已合并的内容不会被重排。
pub fn merge_into(accumulator: &mut Output, source: Output, options: &ProcessOptions) {
    if source.is_empty() {
        return;
    }

    if options.flatten_output {
        for (key, value) in source {
            if accumulator.contains_key(&key) {
                if options.merge_keep_first {
                    debug!(key = %key, "Skipping key because it already exists in output");
                    continue;
                }
                debug!(key = %key, "Replacing existing key in output");
            }
            accumulator.insert(key, value);
        }
    } else {
        match accumulator.get_mut(ITEMS_KEY) {
            Some(Value::Array(items)) => items.push(Value::Object(source)),
            _ => {
                accumulator.insert(
                    ITEMS_KEY.to_string(),
                    Value::Array(vec![Value::Object(source)]),
                );
            }
        }
    }
}
