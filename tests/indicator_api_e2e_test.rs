// ==========================================
// IndicatorApi 端到端集成测试
// ==========================================
// 测试目标: 从 SQLite 来源关系到三张输出表的完整链路
// 覆盖范围: 可靠性表 / 缺口表 / 成本表 / 聚合指标 / 缓存失效
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use medequip_dss::api::IndicatorApi;
use medequip_dss::cache::{Clock, SourceCache};
use medequip_dss::domain::types::Priority;
use medequip_dss::engine::{CostAggregator, CostParams, ReliabilityEngine, StockPolicyResolver};
use medequip_dss::repository::{
    EquipmentRepository, PartCatalogRepository, ServiceEventRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// 测试辅助
// ==========================================

/// 固定时钟: 2026-03-15
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        today().and_hms_opt(8, 0, 0).unwrap()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

fn days_ago(n: i64) -> String {
    (today() - Duration::days(n)).to_string()
}

fn setup_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    medequip_dss::db::configure_sqlite_connection(&conn).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE model (id TEXT PRIMARY KEY, name TEXT NOT NULL, brand TEXT NOT NULL);
        CREATE TABLE equipment_unit (
            id TEXT PRIMARY KEY, model_id TEXT NOT NULL, client_id TEXT NOT NULL,
            install_date TEXT, last_failure_date TEXT,
            failure_count INTEGER NOT NULL, operating_days INTEGER NOT NULL,
            state TEXT NOT NULL
        );
        CREATE TABLE part (
            id TEXT PRIMARY KEY, description TEXT NOT NULL,
            category TEXT NOT NULL, criticality TEXT NOT NULL
        );
        CREATE TABLE part_model_compat (part_id TEXT NOT NULL, model_id TEXT NOT NULL);
        CREATE TABLE stock_policy_tier (
            id TEXT PRIMARY KEY, part_id TEXT NOT NULL,
            units_min INTEGER NOT NULL, units_max INTEGER, min_stock REAL NOT NULL
        );
        CREATE TABLE inventory (part_id TEXT PRIMARY KEY, current_stock);
        CREATE TABLE technician (
            id TEXT PRIMARY KEY, name TEXT NOT NULL,
            gross_salary REAL NOT NULL, vehicle_km_per_liter REAL NOT NULL
        );
        CREATE TABLE service_event (
            id TEXT PRIMARY KEY, service_date TEXT NOT NULL,
            technician_id TEXT NOT NULL, equipment_id TEXT NOT NULL,
            duration_hours REAL NOT NULL, km_traveled REAL NOT NULL
        );
        CREATE TABLE service_part_usage (
            service_id TEXT NOT NULL, part_id TEXT NOT NULL,
            quantity REAL NOT NULL, unit_price REAL NOT NULL
        );
        "#,
    )
    .unwrap();

    conn.execute_batch(
        r#"
        INSERT INTO model VALUES ('M-A', 'Alpha', 'ACME');
        INSERT INTO model VALUES ('M-B', 'Beta', 'ACME');

        INSERT INTO part VALUES ('P-1', 'HEPA filter', 'FILTER', 'HIGH');
        INSERT INTO part_model_compat VALUES ('P-1', 'M-A');
        INSERT INTO part_model_compat VALUES ('P-1', 'M-B');
        INSERT INTO stock_policy_tier VALUES ('T-1', 'P-1', 0, 100, 5.0);
        INSERT INTO stock_policy_tier VALUES ('T-2', 'P-1', 101, NULL, 10.0);
        INSERT INTO inventory VALUES ('P-1', 8);

        INSERT INTO technician VALUES ('TEC-1', 'A. Ramos', 3200.0, 12.0);
        INSERT INTO service_event VALUES ('S-1', '2026-02-10', 'TEC-1', 'EQ-1', 4.0, 60.0);
        INSERT INTO service_part_usage VALUES ('S-1', 'P-1', 2.0, 10.0);
        INSERT INTO service_part_usage VALUES ('S-1', 'P-1', 1.0, 4.0);
        "#,
    )
    .unwrap();

    // 50 台 M-A + 120 台 M-B (档位场景: 5 + 10 = 15)
    for i in 0..50 {
        conn.execute(
            "INSERT INTO equipment_unit VALUES (?1, 'M-A', 'C-1', NULL, NULL, 0, 0, 'ACTIVE')",
            [format!("A-{}", i)],
        )
        .unwrap();
    }
    for i in 0..120 {
        conn.execute(
            "INSERT INTO equipment_unit VALUES (?1, 'M-B', 'C-1', NULL, NULL, 0, 0, 'ACTIVE')",
            [format!("B-{}", i)],
        )
        .unwrap();
    }

    // 可靠性场景设备
    conn.execute(
        "INSERT INTO equipment_unit VALUES ('EQ-1', 'M-A', 'C-2', ?1, ?2, 2, 730, 'ACTIVE')",
        [days_ago(900), days_ago(100)],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO equipment_unit VALUES ('EQ-2', 'M-A', 'C-2', ?1, ?2, 3, 90, 'ACTIVE')",
        [days_ago(300), days_ago(40)],
    )
    .unwrap();

    Arc::new(Mutex::new(conn))
}

fn setup_api(conn: Arc<Mutex<Connection>>) -> IndicatorApi {
    let cache = Arc::new(SourceCache::new(
        EquipmentRepository::from_connection(Arc::clone(&conn)),
        PartCatalogRepository::from_connection(Arc::clone(&conn)),
        ServiceEventRepository::from_connection(conn),
        Arc::new(FixedClock),
        300,
    ));
    IndicatorApi::new(
        cache,
        ReliabilityEngine::new(),
        StockPolicyResolver::new(),
        CostAggregator::new(CostParams::default()),
    )
}

// ==========================================
// 可靠性表
// ==========================================

#[test]
fn test_reliability_table_scenarios() {
    let api = setup_api(setup_db());
    let table = api.reliability_table().unwrap();

    let eq1 = table.iter().find(|r| r.equipment_id == "EQ-1").unwrap();
    assert_eq!(eq1.mtbf_days, Some(365.0));
    assert_eq!(eq1.next_failure_date, Some(today() + Duration::days(265)));
    assert_eq!(eq1.priority, Priority::Normal);
    assert_eq!(eq1.model_name, "Alpha");
    assert_eq!(eq1.mtbf_text, "365 days (1.0 years)");

    let eq2 = table.iter().find(|r| r.equipment_id == "EQ-2").unwrap();
    assert_eq!(eq2.mtbf_days, Some(30.0));
    assert_eq!(eq2.next_failure_date, Some(today() + Duration::days(10)));
    assert_eq!(eq2.priority, Priority::HighPriority);

    // 无故障设备 → NoData
    let a0 = table.iter().find(|r| r.equipment_id == "A-0").unwrap();
    assert!(a0.mtbf_days.is_none());
    assert_eq!(a0.priority, Priority::NoData);
    assert_eq!(a0.mtbf_text, "N/A");
}

#[test]
fn test_reliability_table_idempotent() {
    let api = setup_api(setup_db());
    let first = api.reliability_table().unwrap();
    let second = api.reliability_table().unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.equipment_id, b.equipment_id);
        assert_eq!(a.mtbf_days, b.mtbf_days);
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.next_failure_text, b.next_failure_text);
    }
}

// ==========================================
// 缺口表
// ==========================================

#[test]
fn test_deficit_table_tiered_scenario() {
    let api = setup_api(setup_db());
    let full = api.deficit_table_full().unwrap();

    // M-A 装机 52 (50 + EQ-1 + EQ-2) → 档位 [0,100] 贡献 5
    // M-B 装机 120 → 档位 [101,∞) 贡献 10;合计 15,库存 8 → 缺口 7
    assert_eq!(full.len(), 1);
    let row = &full[0];
    assert_eq!(row.part_id, "P-1");
    assert_eq!(row.required_stock, 15.0);
    assert_eq!(row.current_stock, 8.0);
    assert_eq!(row.deficit, 7.0);
    assert_eq!(row.associated_models, "Alpha, Beta");

    let action = api.deficit_table_needs_action().unwrap();
    assert_eq!(action.len(), 1);
}

#[test]
fn test_deficit_never_negative_when_stock_abundant() {
    let conn = setup_db();
    {
        let c = conn.lock().unwrap();
        c.execute("UPDATE inventory SET current_stock = 500 WHERE part_id = 'P-1'", [])
            .unwrap();
    }
    let api = setup_api(conn);

    let full = api.deficit_table_full().unwrap();
    assert_eq!(full[0].deficit, 0.0);

    // 完整报表保留该行,需采购集为空
    assert!(api.deficit_table_needs_action().unwrap().is_empty());
}

// ==========================================
// 成本表
// ==========================================

#[test]
fn test_cost_table_breakdown() {
    let api = setup_api(setup_db());
    let costs = api.cost_table().unwrap();

    assert_eq!(costs.len(), 1);
    let row = &costs[0];
    // 人工 4×(3200×1.35/160)=108; 燃油 60×(1.0/12)=5; 备件 2×10+1×4=24
    assert!((row.labor_cost - 108.0).abs() < 1e-9);
    assert!((row.fuel_cost - 5.0).abs() < 1e-9);
    assert!((row.parts_cost - 24.0).abs() < 1e-9);
    assert!((row.total_cost - 137.0).abs() < 1e-9);
    assert_eq!(row.technician_name.as_deref(), Some("A. Ramos"));
}

// ==========================================
// 聚合指标与缓存
// ==========================================

#[test]
fn test_fleet_summary_counts() {
    let api = setup_api(setup_db());
    let summary = api.fleet_summary().unwrap();

    assert_eq!(summary.total_units, 172);
    assert_eq!(summary.critical_units, 0);
    assert_eq!(summary.high_priority_units, 1);
    assert_eq!(summary.parts_needing_action, 1);
}

#[test]
fn test_invalidate_picks_up_source_changes() {
    let conn = setup_db();
    let api = setup_api(Arc::clone(&conn));

    // 首次读取建立快照
    assert_eq!(api.deficit_table_full().unwrap()[0].current_stock, 8.0);

    // 外部协作方登记变更后,未失效前仍读旧快照
    {
        let c = conn.lock().unwrap();
        c.execute("UPDATE inventory SET current_stock = 14 WHERE part_id = 'P-1'", [])
            .unwrap();
    }
    assert_eq!(api.deficit_table_full().unwrap()[0].current_stock, 8.0);

    // 显式失效后读到新值
    api.invalidate_cache();
    let row = &api.deficit_table_full().unwrap()[0];
    assert_eq!(row.current_stock, 14.0);
    assert_eq!(row.deficit, 1.0);
}

#[test]
fn test_missing_source_relations_is_hard_error() {
    let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
    let api = setup_api(conn);

    assert!(api.reliability_table().is_err());
    assert!(api.deficit_table_full().is_err());
    assert!(api.cost_table().is_err());
}
