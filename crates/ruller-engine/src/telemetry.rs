//! 规则引擎指标
//!
//! 通过 metrics facade 上报，具体导出由宿主进程安装的 recorder 决定。

/// 组评估耗时直方图
pub const RULES_CALCULATION_SECONDS: &str = "ruller_rules_calculation_seconds";
/// 组内已注册规则数
pub const RULES_ACTIVE_COUNT: &str = "ruller_rules_active_count";

/// 评估成功的状态分类
pub const STATUS_OK: &str = "2xx";
/// 评估失败的状态分类
pub const STATUS_ERROR: &str = "5xx";

/// 注册指标描述（出现在 /metrics 的 HELP 注释中）
pub fn describe() {
    metrics::describe_histogram!(
        RULES_CALCULATION_SECONDS,
        metrics::Unit::Seconds,
        "Ruller rules group calculation duration buckets"
    );
    metrics::describe_counter!(
        RULES_ACTIVE_COUNT,
        "Number of active rules in each rule group"
    );
}

/// 记录一次规则注册
#[inline]
pub fn record_rule_registered(group: &str) {
    metrics::counter!(RULES_ACTIVE_COUNT, "group" => group.to_string()).increment(1);
}

/// 记录一次组评估
#[inline]
pub fn record_group_evaluation(group: &str, status: &'static str, duration_secs: f64) {
    metrics::histogram!(
        RULES_CALCULATION_SECONDS,
        "group" => group.to_string(),
        "status" => status
    )
    .record(duration_secs);
}
