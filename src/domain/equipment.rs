// ==========================================
// 医疗设备DSS - 设备领域模型
// ==========================================
// 来源关系: equipment_unit / model
// 约束: 核心只读,设备记录由外部服务登记流程变更
// ==========================================

use crate::domain::types::LifecycleState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// EquipmentUnit - 在装设备
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentUnit {
    pub equipment_id: String,              // 设备ID
    pub model_id: String,                  // 所装型号
    pub client_id: String,                 // 客户ID
    pub install_date: Option<NaiveDate>,   // 安装日期
    pub last_failure_date: Option<NaiveDate>, // 最近一次故障日期
    pub failure_count: i64,                // 累计故障次数
    pub operating_days: i64,               // 累计运行天数
    pub state: LifecycleState,             // 生命周期状态
}

impl EquipmentUnit {
    /// 是否在役 (备件档位计数只统计在役设备)
    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }
}

// ==========================================
// Model - 设备型号
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub model_id: String, // 型号ID
    pub name: String,     // 型号名称
    pub brand: String,    // 品牌
}
