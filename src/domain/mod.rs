// ==========================================
// 医疗设备DSS - 领域层
// ==========================================
// 职责: 实体与类型定义,无 I/O,无业务编排
// ==========================================

pub mod equipment;
pub mod indicators;
pub mod part;
pub mod service;
pub mod types;

// 重导出核心实体
pub use equipment::{EquipmentUnit, Model};
pub use indicators::{ReliabilitySummary, ServiceCost, StockDeficit};
pub use part::{InventoryRecord, Part, PartCompatibility, StockPolicyTier};
pub use service::{ConsumedPart, ServiceEvent, Technician};
pub use types::{Criticality, LifecycleState, Priority};
