// ==========================================
// 医疗设备DSS - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (可靠性指标 + 备件库存缺口 + 服务成本)
// 分层: Repository (数据访问) → Cache (快照) → Engine (纯计算) → API
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 快照缓存层 - 时间盒读穿缓存
pub mod cache;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 导出层 - 输出表 CSV 序列化
pub mod export;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Criticality, LifecycleState, Priority};

// 领域实体
pub use domain::{
    ConsumedPart, EquipmentUnit, InventoryRecord, Model, Part, PartCompatibility,
    ReliabilitySummary, ServiceCost, ServiceEvent, StockDeficit, StockPolicyTier, Technician,
};

// 引擎
pub use engine::{format_days, CostAggregator, CostParams, ReliabilityEngine, StockPolicyResolver};

// 缓存
pub use cache::{Clock, SourceCache, SourceSnapshot, SystemClock};

// API
pub use api::{ApiError, ApiResult, FleetSummary, IndicatorApi};

// 配置
pub use config::ConfigManager;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "医疗设备技术指标决策支持系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
