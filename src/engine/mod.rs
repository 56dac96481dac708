// ==========================================
// 医疗设备DSS - 引擎层
// ==========================================
// 红线: 引擎无状态,纯计算,不访问 Repository
// 输入为类型化记录快照,输出为派生指标行
// ==========================================

pub mod cost;
pub mod reliability;
pub mod stock_policy;

// 重导出核心引擎
pub use cost::{CostAggregator, CostParams};
pub use reliability::{format_days, ReliabilityEngine};
pub use stock_policy::StockPolicyResolver;
