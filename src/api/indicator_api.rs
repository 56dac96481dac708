// ==========================================
// 医疗设备DSS - 指标 API
// ==========================================
// 职责: 封装缓存与引擎,向看板/导出协作方提供三张只读输出表
// 架构: API 层 → 快照缓存 → 引擎层 (纯计算)
// ==========================================

use crate::api::error::ApiResult;
use crate::cache::SourceCache;
use crate::domain::indicators::{ReliabilitySummary, ServiceCost, StockDeficit};
use crate::domain::types::Priority;
use crate::engine::{CostAggregator, ReliabilityEngine, StockPolicyResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// FleetSummary - 看板顶部聚合指标
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_units: usize,          // 设备总数
    pub critical_units: usize,       // 危急设备数
    pub high_priority_units: usize,  // 高优先级设备数
    pub parts_needing_action: usize, // 需采购备件数
}

// ==========================================
// IndicatorApi - 指标 API
// ==========================================
/// 指标API
///
/// 职责：
/// 1. 设备可靠性表 (每台设备一行)
/// 2. 备件缺口表 (需采购集 / 完整策略报表)
/// 3. 服务成本表 (每个服务事件一行)
///
/// 架构说明：
/// - 三张表均为同一来源快照上的纯函数,读取即重算
/// - 快照由 SourceCache 按固定间隔时间盒管理
pub struct IndicatorApi {
    cache: Arc<SourceCache>,
    reliability_engine: ReliabilityEngine,
    stock_resolver: StockPolicyResolver,
    cost_aggregator: CostAggregator,
}

impl IndicatorApi {
    /// 创建新的 IndicatorApi 实例
    pub fn new(
        cache: Arc<SourceCache>,
        reliability_engine: ReliabilityEngine,
        stock_resolver: StockPolicyResolver,
        cost_aggregator: CostAggregator,
    ) -> Self {
        Self {
            cache,
            reliability_engine,
            stock_resolver,
            cost_aggregator,
        }
    }

    // ==========================================
    // 输出表查询接口
    // ==========================================

    /// 设备可靠性表
    pub fn reliability_table(&self) -> ApiResult<Vec<ReliabilitySummary>> {
        let snapshot = self.cache.snapshot()?;
        let today = self.cache.today();

        Ok(self
            .reliability_engine
            .summarize_all(&snapshot.units, &snapshot.models, today))
    }

    /// 备件缺口表 - 完整策略报表 (required_stock > 0 的全部备件)
    pub fn deficit_table_full(&self) -> ApiResult<Vec<StockDeficit>> {
        let snapshot = self.cache.snapshot()?;

        Ok(self.stock_resolver.resolve_all(
            &snapshot.units,
            &snapshot.models,
            &snapshot.parts,
            &snapshot.compatibility,
            &snapshot.tiers,
            &snapshot.inventory,
        ))
    }

    /// 备件缺口表 - 需采购集 (deficit > 0)
    ///
    /// 空表表示"完全合规",不是错误
    pub fn deficit_table_needs_action(&self) -> ApiResult<Vec<StockDeficit>> {
        Ok(self
            .deficit_table_full()?
            .into_iter()
            .filter(|d| d.needs_action())
            .collect())
    }

    /// 服务成本表
    pub fn cost_table(&self) -> ApiResult<Vec<ServiceCost>> {
        let snapshot = self.cache.snapshot()?;

        Ok(self.cost_aggregator.aggregate_all(
            &snapshot.events,
            &snapshot.technicians,
            &snapshot.part_usage,
        ))
    }

    /// 看板顶部聚合指标
    pub fn fleet_summary(&self) -> ApiResult<FleetSummary> {
        let reliability = self.reliability_table()?;
        let needs_action = self.deficit_table_needs_action()?;

        Ok(FleetSummary {
            total_units: reliability.len(),
            critical_units: reliability
                .iter()
                .filter(|r| r.priority == Priority::Critical)
                .count(),
            high_priority_units: reliability
                .iter()
                .filter(|r| r.priority == Priority::HighPriority)
                .count(),
            parts_needing_action: needs_action.len(),
        })
    }

    /// 快照失效钩子 (服务登记等外部变更后调用)
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }
}
