// ==========================================
// 医疗设备DSS - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统
// 用法:
//   medequip-dss [db_path] [export_dir]
// 传入 export_dir 时额外将三张输出表导出为 CSV
// ==========================================

use medequip_dss::api::IndicatorApi;
use medequip_dss::cache::{SourceCache, SystemClock};
use medequip_dss::config::ConfigManager;
use medequip_dss::db::{get_default_db_path, open_sqlite_connection, read_schema_version};
use medequip_dss::engine::{CostAggregator, ReliabilityEngine, StockPolicyResolver};
use medequip_dss::export;
use medequip_dss::repository::{
    EquipmentRepository, PartCatalogRepository, ServiceEventRepository,
};
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn Error>> {
    // 初始化日志系统
    medequip_dss::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", medequip_dss::APP_NAME);
    tracing::info!("系统版本: {}", medequip_dss::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(get_default_db_path);
    let export_dir = args.next();

    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)?;
    match read_schema_version(&conn)? {
        Some(v) if v == medequip_dss::db::CURRENT_SCHEMA_VERSION => {}
        Some(v) => tracing::warn!(
            "schema_version={} 与代码期望 {} 不一致,请检查数据库",
            v,
            medequip_dss::db::CURRENT_SCHEMA_VERSION
        ),
        None => tracing::warn!("未找到 schema_version 表,可能是未初始化的数据库"),
    }
    let conn = Arc::new(Mutex::new(conn));

    // 组装缓存与引擎 (参数来自 config_kv,缺省时用文档化默认值)
    let config = ConfigManager::from_connection(Arc::clone(&conn))?;
    let cache = Arc::new(SourceCache::new(
        EquipmentRepository::from_connection(Arc::clone(&conn)),
        PartCatalogRepository::from_connection(Arc::clone(&conn)),
        ServiceEventRepository::from_connection(Arc::clone(&conn)),
        Arc::new(SystemClock),
        config.refresh_interval_seconds(),
    ));
    let api = IndicatorApi::new(
        cache,
        ReliabilityEngine::with_params(
            config.horizon_days(),
            config.high_priority_window_days(),
        ),
        StockPolicyResolver::new(),
        CostAggregator::new(config.cost_params()),
    );

    // 看板顶部聚合指标
    let summary = api.fleet_summary()?;
    tracing::info!(
        "设备总数={}, 危急={}, 高优先级={}, 需采购备件={}",
        summary.total_units,
        summary.critical_units,
        summary.high_priority_units,
        summary.parts_needing_action
    );
    tracing::debug!("fleet_summary_json={}", serde_json::to_string(&summary)?);

    // 需采购备件明细
    for deficit in api.deficit_table_needs_action()? {
        tracing::info!(
            "备件 {} ({}) 需求={} 库存={} 缺口={} [{}]",
            deficit.part_id,
            deficit.description,
            deficit.required_stock,
            deficit.current_stock,
            deficit.deficit,
            deficit.associated_models
        );
    }

    // 可选: CSV 导出
    if let Some(dir) = export_dir {
        let dir = Path::new(&dir);
        std::fs::create_dir_all(dir)?;

        export::write_reliability_csv(
            File::create(dir.join("reliability.csv"))?,
            &api.reliability_table()?,
        )?;
        export::write_deficit_csv(
            File::create(dir.join("stock_deficit.csv"))?,
            &api.deficit_table_full()?,
        )?;
        export::write_cost_csv(File::create(dir.join("service_cost.csv"))?, &api.cost_table()?)?;

        tracing::info!("输出表已导出到 {}", dir.display());
    }

    Ok(())
}
