// ==========================================
// 医疗设备DSS - 备件领域模型
// ==========================================
// 来源关系: part / part_model_compat / stock_policy_tier / inventory
// 说明: 兼容关系与库存策略为静态参考数据
// ==========================================

use crate::domain::types::Criticality;
use serde::{Deserialize, Serialize};

// ==========================================
// Part - 备件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub part_id: String,          // 备件ID
    pub description: String,      // 描述
    pub category: String,         // 类别
    pub criticality: Criticality, // 关键度
}

// ==========================================
// PartCompatibility - 备件-型号兼容关系
// ==========================================
// 多对多关联,按来源顺序参与策略匹配
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartCompatibility {
    pub part_id: String,  // 备件ID
    pub model_id: String, // 型号ID
}

// ==========================================
// StockPolicyTier - 备件库存策略档位
// ==========================================
// 语义: 对某备件,当兼容型号的在役装机数落入 [units_min, units_max]
// 区间时,该型号要求的最低备件库存为 min_stock。
// units_max 缺失表示上不封顶。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPolicyTier {
    pub tier_id: String,         // 档位ID
    pub part_id: String,         // 备件ID
    pub units_min: i64,          // 装机数下界 (含)
    pub units_max: Option<i64>,  // 装机数上界 (含, None=无上界)
    pub min_stock: f64,          // 该档位要求的最低库存
}

impl StockPolicyTier {
    /// 判断装机数是否落入本档位区间
    pub fn contains(&self, installed_units: i64) -> bool {
        if installed_units < self.units_min {
            return false;
        }
        match self.units_max {
            Some(max) => installed_units <= max,
            None => true,
        }
    }

    /// 判断两个档位的区间是否重叠 (加载期校验用)
    pub fn overlaps(&self, other: &StockPolicyTier) -> bool {
        let self_max = self.units_max.unwrap_or(i64::MAX);
        let other_max = other.units_max.unwrap_or(i64::MAX);
        self.units_min <= other_max && other.units_min <= self_max
    }
}

// ==========================================
// InventoryRecord - 当前库存
// ==========================================
// current_stock 读取时做防御性数值化,异常值按 0 处理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub part_id: String,    // 备件ID
    pub current_stock: f64, // 当前库存量
}
