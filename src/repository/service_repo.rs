// ==========================================
// 医疗设备DSS - 服务事件数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: service_event / service_part_usage / technician 的只读访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::service::{ConsumedPart, ServiceEvent, Technician};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// ServiceEventRepository - 服务事件仓储
// ==========================================
pub struct ServiceEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ServiceEventRepository {
    /// 创建新的 ServiceEventRepository 实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取全部服务事件
    pub fn list_events(&self) -> RepositoryResult<Vec<ServiceEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                id, service_date, technician_id, equipment_id,
                duration_hours, km_traveled
            FROM service_event
            ORDER BY service_date, rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ServiceEvent {
                service_id: row.get(0)?,
                service_date: row.get(1)?,
                technician_id: row.get(2)?,
                equipment_id: row.get(3)?,
                duration_hours: row.get(4)?,
                km_traveled: row.get(5)?,
            })
        })?;

        let mut events = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let event = row?;
            if !seen.insert(event.service_id.clone()) {
                return Err(RepositoryError::ValidationError(format!(
                    "service_event 主键重复: {}",
                    event.service_id
                )));
            }
            events.push(event);
        }

        Ok(events)
    }

    /// 读取全部备件消耗明细 (服务单 1:N 消耗行)
    pub fn list_part_usage(&self) -> RepositoryResult<Vec<ConsumedPart>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT service_id, part_id, quantity, unit_price
            FROM service_part_usage
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ConsumedPart {
                service_id: row.get(0)?,
                part_id: row.get(1)?,
                quantity: row.get(2)?,
                unit_price: row.get(3)?,
            })
        })?;

        let mut usage = Vec::new();
        for row in rows {
            usage.push(row?);
        }
        Ok(usage)
    }

    /// 读取技术员费率数据
    pub fn list_technicians(&self) -> RepositoryResult<Vec<Technician>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, gross_salary, vehicle_km_per_liter
            FROM technician
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Technician {
                technician_id: row.get(0)?,
                name: row.get(1)?,
                gross_salary: row.get(2)?,
                vehicle_km_per_liter: row.get(3)?,
            })
        })?;

        let mut technicians = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let tech = row?;
            if !seen.insert(tech.technician_id.clone()) {
                return Err(RepositoryError::ValidationError(format!(
                    "technician 主键重复: {}",
                    tech.technician_id
                )));
            }
            technicians.push(tech);
        }

        Ok(technicians)
    }
}
