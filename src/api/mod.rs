// ==========================================
// 医疗设备DSS - API层
// ==========================================
// 职责: 业务接口封装,面向看板/导出协作方
// ==========================================

pub mod error;
pub mod indicator_api;

pub use error::{ApiError, ApiResult};
pub use indicator_api::{FleetSummary, IndicatorApi};
