// ==========================================
// 医疗设备DSS - 设备数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: equipment_unit / model 表的只读访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::equipment::{EquipmentUnit, Model};
use crate::domain::types::LifecycleState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// EquipmentRepository - 设备仓储
// ==========================================
/// 设备仓储
/// 职责: 读取在装设备与型号目录
/// 红线: 不含业务逻辑,只负责数据访问
pub struct EquipmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EquipmentRepository {
    /// 创建新的 EquipmentRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取全部在装设备
    ///
    /// # 说明
    /// - 未知生命周期状态按在役处理并告警 (数据质量问题不阻断读取)
    /// - 主键重复在加载期校验 (关联基数契约: 一对一)
    pub fn list_units(&self) -> RepositoryResult<Vec<EquipmentUnit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                id, model_id, client_id, install_date, last_failure_date,
                failure_count, operating_days, state
            FROM equipment_unit
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let state_raw: String = row.get(7)?;
            Ok((
                EquipmentUnit {
                    equipment_id: row.get(0)?,
                    model_id: row.get(1)?,
                    client_id: row.get(2)?,
                    install_date: row.get(3)?,
                    last_failure_date: row.get(4)?,
                    failure_count: row.get(5)?,
                    operating_days: row.get(6)?,
                    state: LifecycleState::parse(&state_raw).unwrap_or(LifecycleState::Active),
                },
                state_raw,
            ))
        })?;

        let mut units = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let (unit, state_raw) = row?;
            if LifecycleState::parse(&state_raw).is_none() {
                tracing::warn!(
                    "设备 {} 的状态值非法: {:?},按 ACTIVE 处理",
                    unit.equipment_id,
                    state_raw
                );
            }
            if !seen.insert(unit.equipment_id.clone()) {
                return Err(RepositoryError::ValidationError(format!(
                    "equipment_unit 主键重复: {}",
                    unit.equipment_id
                )));
            }
            units.push(unit);
        }

        Ok(units)
    }

    /// 读取全部型号目录
    pub fn list_models(&self) -> RepositoryResult<Vec<Model>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, brand FROM model ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Model {
                model_id: row.get(0)?,
                name: row.get(1)?,
                brand: row.get(2)?,
            })
        })?;

        let mut models = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let model = row?;
            if !seen.insert(model.model_id.clone()) {
                return Err(RepositoryError::ValidationError(format!(
                    "model 主键重复: {}",
                    model.model_id
                )));
            }
            models.push(model);
        }

        Ok(models)
    }
}
