// ==========================================
// 医疗设备DSS - 服务成本聚合引擎
// ==========================================
// 职责: 每个服务事件的成本分解 (人工/燃油/备件/合计)
// 输入: 服务事件 + 技术员费率 + 备件消耗明细
// 输出: ServiceCost (每个服务事件一行)
// ==========================================
// 口径:
// - 人工 = 工时 × (月毛工资 × 工资负担系数) / 月基准工时
// - 燃油 = 里程 × (油价/升 ÷ 车辆公里/升)
// - 备件 = Σ 数量 × 单价
// - 关联缺失时对应成本按 0 计,不传播未定义
// ==========================================

use crate::domain::indicators::ServiceCost;
use crate::domain::service::{ConsumedPart, ServiceEvent, Technician};
use std::collections::HashMap;

/// 默认工资负担系数 (近似社保/福利等雇主负担)
pub const DEFAULT_PAYROLL_BURDEN_FACTOR: f64 = 1.35;

/// 默认月基准工时 (小时)
pub const DEFAULT_REFERENCE_MONTH_HOURS: f64 = 160.0;

/// 默认油价 (每升)
pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 1.0;

// ==========================================
// CostParams - 成本核算参数
// ==========================================
#[derive(Debug, Clone)]
pub struct CostParams {
    pub payroll_burden_factor: f64,
    pub reference_month_hours: f64,
    pub fuel_price_per_liter: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            payroll_burden_factor: DEFAULT_PAYROLL_BURDEN_FACTOR,
            reference_month_hours: DEFAULT_REFERENCE_MONTH_HOURS,
            fuel_price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
        }
    }
}

// ==========================================
// CostAggregator - 成本聚合器
// ==========================================
pub struct CostAggregator {
    params: CostParams,
}

impl Default for CostAggregator {
    fn default() -> Self {
        Self::new(CostParams::default())
    }
}

impl CostAggregator {
    /// 构造函数
    pub fn new(params: CostParams) -> Self {
        Self { params }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 聚合全部服务事件的成本分解
    ///
    /// # 参数
    /// - `events`: 服务事件列表
    /// - `technicians`: 技术员ID到费率数据的映射
    /// - `part_usage`: 备件消耗明细 (服务单 1:N)
    pub fn aggregate_all(
        &self,
        events: &[ServiceEvent],
        technicians: &HashMap<String, Technician>,
        part_usage: &[ConsumedPart],
    ) -> Vec<ServiceCost> {
        // 备件成本按服务单预聚合
        let mut parts_by_service: HashMap<&str, f64> = HashMap::new();
        for usage in part_usage {
            *parts_by_service.entry(usage.service_id.as_str()).or_insert(0.0) +=
                usage.quantity * usage.unit_price;
        }

        events
            .iter()
            .map(|event| {
                let technician = technicians.get(&event.technician_id);
                let parts_cost = parts_by_service
                    .get(event.service_id.as_str())
                    .copied()
                    .unwrap_or(0.0);
                self.aggregate(event, technician, parts_cost)
            })
            .collect()
    }

    /// 单个服务事件的成本分解
    pub fn aggregate(
        &self,
        event: &ServiceEvent,
        technician: Option<&Technician>,
        parts_cost: f64,
    ) -> ServiceCost {
        // 1. 人工成本 (技术员关联缺失时按 0)
        let labor_cost = technician
            .map(|t| self.calculate_labor_cost(event.duration_hours, t))
            .unwrap_or(0.0);

        // 2. 燃油成本 (油耗非正或关联缺失时按 0)
        let fuel_cost = technician
            .map(|t| self.calculate_fuel_cost(event.km_traveled, t))
            .unwrap_or(0.0);

        // 3. 合计
        let total_cost = labor_cost + fuel_cost + parts_cost;

        ServiceCost {
            service_id: event.service_id.clone(),
            service_date: event.service_date,
            equipment_id: event.equipment_id.clone(),
            technician_id: event.technician_id.clone(),
            technician_name: technician.map(|t| t.name.clone()),
            labor_cost,
            fuel_cost,
            parts_cost,
            total_cost,
        }
    }

    // ==========================================
    // 指标计算
    // ==========================================

    /// 人工成本 = 工时 × 全负担时薪
    ///
    /// 全负担时薪 = 月毛工资 × 工资负担系数 / 月基准工时
    fn calculate_labor_cost(&self, duration_hours: f64, technician: &Technician) -> f64 {
        let loaded_hourly_rate = technician.gross_salary * self.params.payroll_burden_factor
            / self.params.reference_month_hours;
        duration_hours * loaded_hourly_rate
    }

    /// 燃油成本 = 里程 × (油价 ÷ 车辆公里/升)
    fn calculate_fuel_cost(&self, km_traveled: f64, technician: &Technician) -> f64 {
        if technician.vehicle_km_per_liter <= 0.0 {
            return 0.0;
        }
        km_traveled * (self.params.fuel_price_per_liter / technician.vehicle_km_per_liter)
    }
}
