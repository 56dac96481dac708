// ==========================================
// 医疗设备DSS - 领域类型定义
// ==========================================
// 依据: 指标看板输出契约 (优先级分级体系)
// 红线: 等级制,不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 优先级 (Priority)
// ==========================================
// 依据预计下次故障日期与当前日期的天数差分级:
// - 已过期 → Critical
// - 0..=90 天 → HighPriority
// - > 90 天 → Normal
// - 无法估算 → NoData
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    NoData,       // 无数据,仅提示
    Normal,       // 正常
    HighPriority, // 高优先级 (90天窗口内)
    Critical,     // 危急 (预计故障日期已过)
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::NoData => write!(f, "NO_DATA"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::HighPriority => write!(f, "HIGH_PRIORITY"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 设备生命周期状态 (Lifecycle State)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Active,  // 在役
    Retired, // 退役
}

impl LifecycleState {
    /// 从数据库字符串解析 (未知值按在役处理并由调用方告警)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(LifecycleState::Active),
            "RETIRED" => Some(LifecycleState::Retired),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "ACTIVE"),
            LifecycleState::Retired => write!(f, "RETIRED"),
        }
    }
}

// ==========================================
// 备件关键度 (Criticality)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    Low,
    Medium,
    High,
}

impl Criticality {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Criticality::Low),
            "MEDIUM" => Some(Criticality::Medium),
            "HIGH" => Some(Criticality::High),
            _ => None,
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::Low => write!(f, "LOW"),
            Criticality::Medium => write!(f, "MEDIUM"),
            Criticality::High => write!(f, "HIGH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        // 优先级排序: NoData < Normal < HighPriority < Critical
        assert!(Priority::Critical > Priority::HighPriority);
        assert!(Priority::HighPriority > Priority::Normal);
        assert!(Priority::Normal > Priority::NoData);
    }

    #[test]
    fn test_lifecycle_state_parse() {
        assert_eq!(LifecycleState::parse("ACTIVE"), Some(LifecycleState::Active));
        assert_eq!(LifecycleState::parse("RETIRED"), Some(LifecycleState::Retired));
        assert_eq!(LifecycleState::parse("unknown"), None);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Priority::HighPriority.to_string(), "HIGH_PRIORITY");
        assert_eq!(Criticality::Medium.to_string(), "MEDIUM");
    }
}
