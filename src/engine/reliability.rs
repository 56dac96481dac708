// ==========================================
// 医疗设备DSS - 可靠性估算引擎
// ==========================================
// 职责: 看板可靠性指标生成
// 输入: 在装设备 + 型号目录
// 输出: ReliabilitySummary (每台设备一行)
// ==========================================
// 模型假设: 恒定故障率 (指数分布生存函数),非拟合分布,
// 属显式简化。MTBF 未定义时相关指标全部置 None,不抛错。
// ==========================================

use crate::domain::equipment::{EquipmentUnit, Model};
use crate::domain::indicators::ReliabilitySummary;
use crate::domain::types::Priority;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// 默认可靠性评估时间窗 (天)
pub const DEFAULT_HORIZON_DAYS: f64 = 180.0;

/// 默认高优先级窗口 (天): 预计故障落在该窗口内视为高优先级
pub const DEFAULT_HIGH_PRIORITY_WINDOW_DAYS: i64 = 90;

// ==========================================
// ReliabilityEngine - 可靠性估算引擎
// ==========================================
pub struct ReliabilityEngine {
    /// 生存概率评估窗口 (天)
    horizon_days: f64,
    /// 高优先级窗口 (天)
    high_priority_window_days: i64,
}

impl Default for ReliabilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReliabilityEngine {
    /// 构造函数 (默认 180 天评估窗 / 90 天高优先级窗口)
    pub fn new() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            high_priority_window_days: DEFAULT_HIGH_PRIORITY_WINDOW_DAYS,
        }
    }

    /// 指定参数构造
    pub fn with_params(horizon_days: f64, high_priority_window_days: i64) -> Self {
        Self {
            horizon_days,
            high_priority_window_days,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成全表可靠性摘要
    ///
    /// # 参数
    /// - `units`: 在装设备列表 (含退役设备,历史指标保持可见)
    /// - `models`: 型号ID到型号的映射
    /// - `today`: 评估日期 (由注入时钟提供)
    ///
    /// # 说明
    /// 每台设备独立纯计算,互不依赖
    pub fn summarize_all(
        &self,
        units: &[EquipmentUnit],
        models: &HashMap<String, Model>,
        today: NaiveDate,
    ) -> Vec<ReliabilitySummary> {
        units
            .iter()
            .map(|unit| self.summarize(unit, models.get(&unit.model_id), today))
            .collect()
    }

    /// 生成单台设备的可靠性摘要
    pub fn summarize(
        &self,
        unit: &EquipmentUnit,
        model: Option<&Model>,
        today: NaiveDate,
    ) -> ReliabilitySummary {
        // 1. MTBF = 运行天数 / 故障次数 (故障次数为 0 时未定义)
        let mtbf_days = self.calculate_mtbf(unit);

        // 2. 指数模型生存概率 exp(-horizon / MTBF)
        let reliability = self.calculate_reliability(mtbf_days);

        // 3. 距上次故障天数
        let days_since_last_failure = unit
            .last_failure_date
            .map(|d| (today - d).num_days());

        // 4. 预计下次故障日期 = 锚点日期 + round(MTBF) 天
        let next_failure_date = self.estimate_next_failure(unit, mtbf_days);

        // 5. 优先级分级
        let priority = self.classify_priority(next_failure_date, today);

        // 6. 展示文本
        let next_failure_text = self.format_next_failure(next_failure_date, today);

        ReliabilitySummary {
            equipment_id: unit.equipment_id.clone(),
            model_name: model
                .map(|m| m.name.clone())
                .unwrap_or_else(|| unit.model_id.clone()),
            brand: model.map(|m| m.brand.clone()).unwrap_or_default(),
            client_id: unit.client_id.clone(),
            failure_count: unit.failure_count,
            operating_days: unit.operating_days,
            mtbf_days,
            reliability_180d: reliability,
            days_since_last_failure,
            next_failure_date,
            priority,
            operating_days_text: format_days(Some(unit.operating_days as f64)),
            mtbf_text: format_days(mtbf_days),
            days_since_last_failure_text: format_days(
                days_since_last_failure.map(|d| d as f64),
            ),
            next_failure_text,
        }
    }

    // ==========================================
    // 指标计算
    // ==========================================

    /// MTBF (平均故障间隔,天)
    ///
    /// # 返回
    /// - Some(mtbf): failure_count > 0
    /// - None: 无故障记录,未定义
    fn calculate_mtbf(&self, unit: &EquipmentUnit) -> Option<f64> {
        if unit.failure_count > 0 {
            Some(unit.operating_days as f64 / unit.failure_count as f64)
        } else {
            None
        }
    }

    /// 评估窗口内的生存概率
    ///
    /// # 说明
    /// 恒定故障率假设下 P(无故障) = exp(-horizon / MTBF);
    /// MTBF → ∞ 时趋近 1,MTBF → 0⁺ 时趋近 0
    fn calculate_reliability(&self, mtbf_days: Option<f64>) -> Option<f64> {
        match mtbf_days {
            Some(mtbf) if mtbf > 0.0 => Some((-self.horizon_days / mtbf).exp()),
            _ => None,
        }
    }

    /// 预计下次故障日期
    ///
    /// # 规则
    /// - 锚点: 最近故障日期,缺失时用安装日期,都缺失则未定义
    /// - 下次故障 = 锚点 + round(MTBF) 天
    fn estimate_next_failure(
        &self,
        unit: &EquipmentUnit,
        mtbf_days: Option<f64>,
    ) -> Option<NaiveDate> {
        let mtbf = match mtbf_days {
            Some(m) if m > 0.0 => m,
            _ => return None,
        };

        let anchor = unit.last_failure_date.or(unit.install_date)?;
        Some(anchor + Duration::days(mtbf.round() as i64))
    }

    /// 优先级分级
    ///
    /// # 规则 (horizon = 下次故障日期 - 今天, 单位天)
    /// - 未定义 → NoData
    /// - horizon < 0 → Critical (预计故障日期已过)
    /// - 0..=高优先级窗口 → HighPriority
    /// - 其余 → Normal
    fn classify_priority(&self, next_failure_date: Option<NaiveDate>, today: NaiveDate) -> Priority {
        let next = match next_failure_date {
            Some(d) => d,
            None => return Priority::NoData,
        };

        let horizon = (next - today).num_days();
        if horizon < 0 {
            Priority::Critical
        } else if horizon <= self.high_priority_window_days {
            Priority::HighPriority
        } else {
            Priority::Normal
        }
    }

    /// 下次故障估计的展示文本
    fn format_next_failure(&self, next_failure_date: Option<NaiveDate>, today: NaiveDate) -> String {
        match next_failure_date {
            None => "not estimable".to_string(),
            Some(date) => {
                let days_until = (date - today).num_days();
                if days_until < 0 {
                    format!("{} (overdue)", date.format("%Y-%m-%d"))
                } else {
                    format!("{} (~{} days)", date.format("%Y-%m-%d"), days_until)
                }
            }
        }
    }
}

// ==========================================
// 展示文本格式化
// ==========================================

/// 天数的可读文本
///
/// # 规则
/// - 未定义或 ≤ 0 → "N/A"
/// - 其余 → "{d} days ({y:.1} years)",年按 365.25 天折算,天数取整
pub fn format_days(days: Option<f64>) -> String {
    match days {
        Some(d) if d > 0.0 => {
            let years = d / 365.25;
            format!("{} days ({:.1} years)", d as i64, years)
        }
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LifecycleState;

    fn create_test_unit(
        failure_count: i64,
        operating_days: i64,
        last_failure_date: Option<NaiveDate>,
        install_date: Option<NaiveDate>,
    ) -> EquipmentUnit {
        EquipmentUnit {
            equipment_id: "EQ-001".to_string(),
            model_id: "M-001".to_string(),
            client_id: "C-001".to_string(),
            install_date,
            last_failure_date,
            failure_count,
            operating_days,
            state: LifecycleState::Active,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_mtbf_undefined_without_failures() {
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(0, 500, None, Some(today() - Duration::days(500)));
        let summary = engine.summarize(&unit, None, today());

        assert!(summary.mtbf_days.is_none());
        assert!(summary.reliability_180d.is_none());
        assert!(summary.next_failure_date.is_none());
        assert_eq!(summary.priority, Priority::NoData);
        assert_eq!(summary.mtbf_text, "N/A");
        assert_eq!(summary.next_failure_text, "not estimable");
    }

    #[test]
    fn test_scenario_normal_priority() {
        // 运行 730 天 / 2 次故障 → MTBF 365;上次故障 100 天前
        // → 下次故障 265 天后 → Normal
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(2, 730, Some(today() - Duration::days(100)), None);
        let summary = engine.summarize(&unit, None, today());

        assert_eq!(summary.mtbf_days, Some(365.0));
        assert_eq!(
            summary.next_failure_date,
            Some(today() + Duration::days(265))
        );
        assert_eq!(summary.priority, Priority::Normal);
    }

    #[test]
    fn test_scenario_high_priority() {
        // 运行 90 天 / 3 次故障 → MTBF 30;上次故障 40 天前
        // → 下次故障 10 天后 → HighPriority
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(3, 90, Some(today() - Duration::days(40)), None);
        let summary = engine.summarize(&unit, None, today());

        assert_eq!(summary.mtbf_days, Some(30.0));
        assert_eq!(
            summary.next_failure_date,
            Some(today() + Duration::days(10))
        );
        assert_eq!(summary.priority, Priority::HighPriority);
    }

    #[test]
    fn test_critical_when_estimate_passed() {
        // MTBF 30,上次故障 45 天前 → 预计日期已过 → Critical
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(3, 90, Some(today() - Duration::days(45)), None);
        let summary = engine.summarize(&unit, None, today());

        assert_eq!(summary.priority, Priority::Critical);
        assert!(summary.next_failure_text.ends_with("(overdue)"));
    }

    #[test]
    fn test_anchor_falls_back_to_install_date() {
        // 无故障日期但有安装日期: 锚点取安装日期
        let install = today() - Duration::days(200);
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(1, 400, None, Some(install));
        let summary = engine.summarize(&unit, None, today());

        assert_eq!(summary.next_failure_date, Some(install + Duration::days(400)));
        assert!(summary.days_since_last_failure.is_none());
    }

    #[test]
    fn test_no_anchor_means_no_estimate() {
        // MTBF 有定义但锚点缺失 → 无估计 → NoData
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(2, 730, None, None);
        let summary = engine.summarize(&unit, None, today());

        assert!(summary.mtbf_days.is_some());
        assert!(summary.next_failure_date.is_none());
        assert_eq!(summary.priority, Priority::NoData);
    }

    #[test]
    fn test_mtbf_rounding_to_whole_days() {
        // MTBF = 500/3 ≈ 166.67 → 锚点 + 167 天
        let last_failure = today() - Duration::days(10);
        let engine = ReliabilityEngine::new();
        let unit = create_test_unit(3, 500, Some(last_failure), None);
        let summary = engine.summarize(&unit, None, today());

        assert_eq!(
            summary.next_failure_date,
            Some(last_failure + Duration::days(167))
        );
    }

    #[test]
    fn test_reliability_monotone_in_mtbf() {
        let engine = ReliabilityEngine::new();
        let r_30 = engine.calculate_reliability(Some(30.0)).unwrap();
        let r_365 = engine.calculate_reliability(Some(365.0)).unwrap();
        let r_huge = engine.calculate_reliability(Some(1.0e12)).unwrap();
        let r_tiny = engine.calculate_reliability(Some(1.0e-9)).unwrap();

        assert!(r_30 < r_365);
        assert!((r_huge - 1.0).abs() < 1e-9);
        assert!(r_tiny < 1e-9);
        // 期望值: exp(-180/365) ≈ 0.6107
        assert!((r_365 - (-180.0f64 / 365.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_days(None), "N/A");
        assert_eq!(format_days(Some(0.0)), "N/A");
        assert_eq!(format_days(Some(-3.0)), "N/A");
        assert_eq!(format_days(Some(365.25)), "365 days (1.0 years)");
        assert_eq!(format_days(Some(730.0)), "730 days (2.0 years)");
        assert_eq!(format_days(Some(100.0)), "100 days (0.3 years)");
    }

    #[test]
    fn test_summarize_all_independent_rows() {
        let engine = ReliabilityEngine::new();
        let units = vec![
            create_test_unit(2, 730, Some(today() - Duration::days(100)), None),
            create_test_unit(0, 100, None, None),
        ];
        let models = HashMap::new();
        let summaries = engine.summarize_all(&units, &models, today());

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].priority, Priority::Normal);
        assert_eq!(summaries[1].priority, Priority::NoData);
    }
}
