// ==========================================
// 医疗设备DSS - 服务事件领域模型
// ==========================================
// 来源关系: service_event / service_part_usage / technician
// 说明: 服务事件登记由外部协作方完成,核心只读
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ServiceEvent - 服务/维修事件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub service_id: String,       // 服务单ID
    pub service_date: NaiveDate,  // 服务日期
    pub technician_id: String,    // 技术员ID
    pub equipment_id: String,     // 设备ID
    pub duration_hours: f64,      // 工时 (小时)
    pub km_traveled: f64,         // 往返里程 (公里)
}

// ==========================================
// ConsumedPart - 服务消耗的备件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedPart {
    pub service_id: String, // 服务单ID
    pub part_id: String,    // 备件ID
    pub quantity: f64,      // 消耗数量
    pub unit_price: f64,    // 单价
}

// ==========================================
// Technician - 技术员费率数据
// ==========================================
// gross_salary 为月毛工资,折算时薪时乘以工资负担系数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub technician_id: String,      // 技术员ID
    pub name: String,               // 姓名
    pub gross_salary: f64,          // 月毛工资
    pub vehicle_km_per_liter: f64,  // 车辆油耗 (公里/升)
}
