// ==========================================
// 医疗设备DSS - 输出表 CSV 导出
// ==========================================
// 职责: 三张输出表的纯序列化,不参与分析契约
// 说明: 未定义指标导出为空单元格,展示文本列原样导出
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::indicators::{ReliabilitySummary, ServiceCost, StockDeficit};
use std::io::Write;

fn map_err(e: csv::Error) -> ApiError {
    ApiError::ExportError(e.to_string())
}

/// 导出设备可靠性表
pub fn write_reliability_csv<W: Write>(
    writer: W,
    rows: &[ReliabilitySummary],
) -> ApiResult<()> {
    let mut w = csv::Writer::from_writer(writer);

    w.write_record([
        "equipment_id",
        "model_name",
        "brand",
        "client_id",
        "failure_count",
        "operating_days",
        "mtbf_days",
        "reliability_180d",
        "days_since_last_failure",
        "next_failure_date",
        "priority",
        "operating_days_text",
        "mtbf_text",
        "days_since_last_failure_text",
        "next_failure_text",
    ])
    .map_err(map_err)?;

    for row in rows {
        let record = vec![
            row.equipment_id.clone(),
            row.model_name.clone(),
            row.brand.clone(),
            row.client_id.clone(),
            row.failure_count.to_string(),
            row.operating_days.to_string(),
            row.mtbf_days.map(|v| v.to_string()).unwrap_or_default(),
            row.reliability_180d
                .map(|v| format!("{:.4}", v))
                .unwrap_or_default(),
            row.days_since_last_failure
                .map(|v| v.to_string())
                .unwrap_or_default(),
            row.next_failure_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.priority.to_string(),
            row.operating_days_text.clone(),
            row.mtbf_text.clone(),
            row.days_since_last_failure_text.clone(),
            row.next_failure_text.clone(),
        ];
        w.write_record(&record).map_err(map_err)?;
    }

    w.flush().map_err(|e| ApiError::ExportError(e.to_string()))
}

/// 导出备件缺口表
pub fn write_deficit_csv<W: Write>(writer: W, rows: &[StockDeficit]) -> ApiResult<()> {
    let mut w = csv::Writer::from_writer(writer);

    w.write_record([
        "part_id",
        "description",
        "category",
        "criticality",
        "required_stock",
        "current_stock",
        "deficit",
        "associated_models",
    ])
    .map_err(map_err)?;

    for row in rows {
        let record = vec![
            row.part_id.clone(),
            row.description.clone(),
            row.category.clone(),
            row.criticality.to_string(),
            row.required_stock.to_string(),
            row.current_stock.to_string(),
            row.deficit.to_string(),
            row.associated_models.clone(),
        ];
        w.write_record(&record).map_err(map_err)?;
    }

    w.flush().map_err(|e| ApiError::ExportError(e.to_string()))
}

/// 导出服务成本表
pub fn write_cost_csv<W: Write>(writer: W, rows: &[ServiceCost]) -> ApiResult<()> {
    let mut w = csv::Writer::from_writer(writer);

    w.write_record([
        "service_id",
        "service_date",
        "equipment_id",
        "technician_id",
        "technician_name",
        "labor_cost",
        "fuel_cost",
        "parts_cost",
        "total_cost",
    ])
    .map_err(map_err)?;

    for row in rows {
        let record = vec![
            row.service_id.clone(),
            row.service_date.to_string(),
            row.equipment_id.clone(),
            row.technician_id.clone(),
            row.technician_name.clone().unwrap_or_default(),
            format!("{:.2}", row.labor_cost),
            format!("{:.2}", row.fuel_cost),
            format!("{:.2}", row.parts_cost),
            format!("{:.2}", row.total_cost),
        ];
        w.write_record(&record).map_err(map_err)?;
    }

    w.flush().map_err(|e| ApiError::ExportError(e.to_string()))
}
