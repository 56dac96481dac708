// ==========================================
// 医疗设备DSS - 派生指标领域模型
// ==========================================
// 用途: 看板/导出只读数据源
// 红线: 派生行不落库,每次读取基于快照重新计算
// ==========================================

use crate::domain::types::{Criticality, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ReliabilitySummary - 设备可靠性摘要
// ==========================================
// 每台设备一行。未定义的指标以 None 表示,不抛错。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilitySummary {
    pub equipment_id: String,   // 设备ID
    pub model_name: String,     // 型号名称
    pub brand: String,          // 品牌
    pub client_id: String,      // 客户ID

    // ===== 原始计数 =====
    pub failure_count: i64,     // 累计故障次数
    pub operating_days: i64,    // 累计运行天数

    // ===== 可靠性指标 =====
    pub mtbf_days: Option<f64>,             // 平均故障间隔 (天)
    pub reliability_180d: Option<f64>,      // 180天生存概率 (指数模型)
    pub days_since_last_failure: Option<i64>, // 距上次故障天数
    pub next_failure_date: Option<NaiveDate>, // 预计下次故障日期

    // ===== 优先级 =====
    pub priority: Priority,     // 优先级分级

    // ===== 展示文本 =====
    pub operating_days_text: String,          // 运行天数文本
    pub mtbf_text: String,                    // MTBF文本
    pub days_since_last_failure_text: String, // 距上次故障文本
    pub next_failure_text: String,            // 下次故障估计文本
}

impl ReliabilitySummary {
    /// 是否需要人工关注 (危急或高优先级)
    pub fn needs_attention(&self) -> bool {
        matches!(self.priority, Priority::Critical | Priority::HighPriority)
    }
}

// ==========================================
// StockDeficit - 备件库存缺口
// ==========================================
// 每个备件一行。deficit 恒为非负。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDeficit {
    pub part_id: String,          // 备件ID
    pub description: String,      // 描述
    pub category: String,         // 类别
    pub criticality: Criticality, // 关键度

    pub required_stock: f64,      // 策略要求的最低库存 (跨型号累加)
    pub current_stock: f64,       // 当前库存
    pub deficit: f64,             // 缺口 = max(required - current, 0)
    pub associated_models: String, // 贡献需求的型号名称 (排序去重,逗号连接)
}

impl StockDeficit {
    /// 是否需要采购动作
    pub fn needs_action(&self) -> bool {
        self.deficit > 0.0
    }
}

// ==========================================
// ServiceCost - 服务成本分解
// ==========================================
// 每个服务事件一行。缺失关联按 0 计,四项成本恒有值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service_id: String,       // 服务单ID
    pub service_date: NaiveDate,  // 服务日期
    pub equipment_id: String,     // 设备ID
    pub technician_id: String,    // 技术员ID
    pub technician_name: Option<String>, // 技术员姓名 (关联缺失时为 None)

    pub labor_cost: f64,          // 人工成本
    pub fuel_cost: f64,           // 燃油成本
    pub parts_cost: f64,          // 备件成本
    pub total_cost: f64,          // 总成本
}
