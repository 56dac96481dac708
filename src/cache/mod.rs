// ==========================================
// 医疗设备DSS - 来源关系快照缓存
// ==========================================
// 职责: 以固定刷新间隔对来源关系做时间盒缓存
// 红线: 快照一经装载即不可变,读取方不会观察到半更新状态
// ==========================================
// 说明:
// - 缓存的是来源关系快照,派生指标每次读取重新计算 (纯函数)
// - 时钟通过 Clock trait 注入,测试用固定时钟
// - 外部协作方登记服务事件后必须调用 invalidate() (或等待间隔到期)
// ==========================================

use crate::domain::equipment::{EquipmentUnit, Model};
use crate::domain::part::{InventoryRecord, Part, PartCompatibility, StockPolicyTier};
use crate::domain::service::{ConsumedPart, ServiceEvent, Technician};
use crate::repository::{
    EquipmentRepository, PartCatalogRepository, RepositoryError, RepositoryResult,
    ServiceEventRepository,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// Clock - 可注入时钟
// ==========================================
pub trait Clock: Send + Sync {
    /// 当前时间 (naive UTC)
    fn now(&self) -> NaiveDateTime;

    /// 当前日期 (指标评估用)
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// 系统时钟
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

// ==========================================
// SourceSnapshot - 来源关系快照
// ==========================================
// 装载后不可变;所有派生表基于同一快照计算
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    pub snapshot_id: String,       // 快照ID
    pub loaded_at: NaiveDateTime,  // 装载时间

    pub units: Vec<EquipmentUnit>,
    pub models: HashMap<String, Model>,
    pub parts: Vec<Part>,
    pub compatibility: Vec<PartCompatibility>,
    pub tiers: Vec<StockPolicyTier>,
    pub inventory: Vec<InventoryRecord>,
    pub events: Vec<ServiceEvent>,
    pub part_usage: Vec<ConsumedPart>,
    pub technicians: HashMap<String, Technician>,
}

// ==========================================
// SourceCache - 读穿式快照缓存
// ==========================================
pub struct SourceCache {
    equipment_repo: EquipmentRepository,
    catalog_repo: PartCatalogRepository,
    service_repo: ServiceEventRepository,
    clock: Arc<dyn Clock>,
    refresh_interval_seconds: i64,
    current: Mutex<Option<Arc<SourceSnapshot>>>,
}

impl SourceCache {
    /// 创建新的 SourceCache 实例
    ///
    /// # 参数
    /// - `refresh_interval_seconds`: 快照有效期 (秒),到期后下次读取触发重装载
    pub fn new(
        equipment_repo: EquipmentRepository,
        catalog_repo: PartCatalogRepository,
        service_repo: ServiceEventRepository,
        clock: Arc<dyn Clock>,
        refresh_interval_seconds: i64,
    ) -> Self {
        Self {
            equipment_repo,
            catalog_repo,
            service_repo,
            clock,
            refresh_interval_seconds,
            current: Mutex::new(None),
        }
    }

    /// 获取当前快照 (读穿: 缺失或过期时重装载)
    ///
    /// # 错误
    /// 来源关系不可用时作为硬错误向上传播,不在内部重试
    pub fn snapshot(&self) -> RepositoryResult<Arc<SourceSnapshot>> {
        let mut guard = self
            .current
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        if let Some(snapshot) = guard.as_ref() {
            let age_seconds = (self.clock.now() - snapshot.loaded_at).num_seconds();
            if age_seconds < self.refresh_interval_seconds {
                return Ok(Arc::clone(snapshot));
            }
            tracing::debug!(
                "快照 {} 已过期 (age={}s, ttl={}s),触发重装载",
                snapshot.snapshot_id,
                age_seconds,
                self.refresh_interval_seconds
            );
        }

        let snapshot = Arc::new(self.load()?);
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// 使当前快照失效 (服务事件登记后的外部失效钩子)
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.current.lock() {
            if let Some(snapshot) = guard.take() {
                tracing::info!("快照 {} 被显式失效", snapshot.snapshot_id);
            }
        }
    }

    /// 评估日期 (与快照计算共用同一注入时钟)
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// 从仓储装载一份完整快照
    fn load(&self) -> RepositoryResult<SourceSnapshot> {
        let loaded_at = self.clock.now();
        let snapshot_id = Uuid::new_v4().to_string();

        let units = self.equipment_repo.list_units()?;
        let models: HashMap<String, Model> = self
            .equipment_repo
            .list_models()?
            .into_iter()
            .map(|m| (m.model_id.clone(), m))
            .collect();
        let parts = self.catalog_repo.list_parts()?;
        let compatibility = self.catalog_repo.list_compatibility()?;
        let tiers = self.catalog_repo.list_policy_tiers()?;
        let inventory = self.catalog_repo.list_inventory()?;
        let events = self.service_repo.list_events()?;
        let part_usage = self.service_repo.list_part_usage()?;
        let technicians: HashMap<String, Technician> = self
            .service_repo
            .list_technicians()?
            .into_iter()
            .map(|t| (t.technician_id.clone(), t))
            .collect();

        tracing::info!(
            "来源快照装载完成: snapshot_id={}, units={}, parts={}, tiers={}, events={}",
            snapshot_id,
            units.len(),
            parts.len(),
            tiers.len(),
            events.len()
        );

        Ok(SourceSnapshot {
            snapshot_id,
            loaded_at,
            units,
            models,
            parts,
            compatibility,
            tiers,
            inventory,
            events,
            part_usage,
            technicians,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    /// 可推进的固定时钟
    struct FixedClock {
        now: Mutex<NaiveDateTime>,
    }

    impl FixedClock {
        fn new(now: NaiveDateTime) -> Self {
            Self { now: Mutex::new(now) }
        }

        fn advance_seconds(&self, seconds: i64) {
            let mut guard = self.now.lock().unwrap();
            *guard = *guard + chrono::Duration::seconds(seconds);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }

    fn setup_cache(clock: Arc<FixedClock>, ttl: i64) -> SourceCache {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE equipment_unit (
                id TEXT PRIMARY KEY, model_id TEXT NOT NULL, client_id TEXT NOT NULL,
                install_date TEXT, last_failure_date TEXT,
                failure_count INTEGER NOT NULL, operating_days INTEGER NOT NULL,
                state TEXT NOT NULL
            );
            CREATE TABLE model (id TEXT PRIMARY KEY, name TEXT NOT NULL, brand TEXT NOT NULL);
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
            CREATE TABLE service_event (
                id TEXT PRIMARY KEY, service_date TEXT NOT NULL,
                technician_id TEXT NOT NULL, equipment_id TEXT NOT NULL,
                duration_hours REAL NOT NULL, km_traveled REAL NOT NULL
            );
            CREATE TABLE service_part_usage (
                service_id TEXT NOT NULL, part_id TEXT NOT NULL,
                quantity REAL NOT NULL, unit_price REAL NOT NULL
            );
            CREATE TABLE technician (
                id TEXT PRIMARY KEY, name TEXT NOT NULL,
                gross_salary REAL NOT NULL, vehicle_km_per_liter REAL NOT NULL
            );
            INSERT INTO model VALUES ('M-1', 'Alpha', 'ACME');
            INSERT INTO equipment_unit VALUES
                ('EQ-1', 'M-1', 'C-1', '2024-01-01', NULL, 0, 100, 'ACTIVE');
            "#,
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        SourceCache::new(
            EquipmentRepository::from_connection(Arc::clone(&conn)),
            PartCatalogRepository::from_connection(Arc::clone(&conn)),
            ServiceEventRepository::from_connection(conn),
            clock,
            ttl,
        )
    }

    fn test_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_snapshot_reused_within_interval() {
        let clock = Arc::new(FixedClock::new(test_now()));
        let cache = setup_cache(Arc::clone(&clock), 300);

        let first = cache.snapshot().unwrap();
        clock.advance_seconds(299);
        let second = cache.snapshot().unwrap();

        assert_eq!(first.snapshot_id, second.snapshot_id);
    }

    #[test]
    fn test_snapshot_reloaded_after_expiry() {
        let clock = Arc::new(FixedClock::new(test_now()));
        let cache = setup_cache(Arc::clone(&clock), 300);

        let first = cache.snapshot().unwrap();
        clock.advance_seconds(300);
        let second = cache.snapshot().unwrap();

        assert_ne!(first.snapshot_id, second.snapshot_id);
        assert_eq!(second.units.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let clock = Arc::new(FixedClock::new(test_now()));
        let cache = setup_cache(Arc::clone(&clock), 300);

        let first = cache.snapshot().unwrap();
        cache.invalidate();
        let second = cache.snapshot().unwrap();

        assert_ne!(first.snapshot_id, second.snapshot_id);
    }

    #[test]
    fn test_missing_source_relation_is_hard_error() {
        let clock = Arc::new(FixedClock::new(test_now()));
        let conn = Connection::open_in_memory().unwrap();
        // 故意不建任何表
        let conn = Arc::new(Mutex::new(conn));
        let cache = SourceCache::new(
            EquipmentRepository::from_connection(Arc::clone(&conn)),
            PartCatalogRepository::from_connection(Arc::clone(&conn)),
            ServiceEventRepository::from_connection(conn),
            clock,
            300,
        );

        assert!(cache.snapshot().is_err());
    }
}
