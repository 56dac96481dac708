// ==========================================
// 医疗设备DSS - 配置管理器
// ==========================================
// 职责: 配置加载、查询
// 存储: config_kv 表 (key-value + scope)
// 缺键或值非法时回落到文档化默认值并告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::cost::{
    CostParams, DEFAULT_FUEL_PRICE_PER_LITER, DEFAULT_PAYROLL_BURDEN_FACTOR,
    DEFAULT_REFERENCE_MONTH_HOURS,
};
use crate::engine::reliability::{DEFAULT_HIGH_PRIORITY_WINDOW_DAYS, DEFAULT_HORIZON_DAYS};
use rusqlite::{params, Connection};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 默认快照刷新间隔 (秒)
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: i64 = 300;

// ==========================================
// 配置键
// ==========================================
pub const KEY_REFRESH_INTERVAL_SECONDS: &str = "cache/refresh_interval_seconds";
pub const KEY_HORIZON_DAYS: &str = "reliability/horizon_days";
pub const KEY_HIGH_PRIORITY_WINDOW_DAYS: &str = "reliability/high_priority_window_days";
pub const KEY_PAYROLL_BURDEN_FACTOR: &str = "cost/payroll_burden_factor";
pub const KEY_REFERENCE_MONTH_HOURS: &str = "cost/reference_month_hours";
pub const KEY_FUEL_PRICE_PER_LITER: &str = "cost/fuel_price_per_liter";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在 (config_kv 表缺失也视为不存在)
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(rusqlite::Error::SqliteFailure(_, Some(msg))) if msg.contains("no such table") => {
                Ok(None)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取数值配置,缺失或非法时用默认值
    fn get_numeric_or<T: FromStr + Copy>(&self, key: &str, default: T) -> T {
        match self.get_config_value(key) {
            Ok(Some(raw)) => match raw.trim().parse::<T>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!("配置 {} 的值非法: {:?},使用默认值", key, raw);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("读取配置 {} 失败: {},使用默认值", key, e);
                default
            }
        }
    }

    // ==========================================
    // 类型化配置读取
    // ==========================================

    /// 快照刷新间隔 (秒,默认 300)
    pub fn refresh_interval_seconds(&self) -> i64 {
        self.get_numeric_or(KEY_REFRESH_INTERVAL_SECONDS, DEFAULT_REFRESH_INTERVAL_SECONDS)
    }

    /// 可靠性评估窗口 (天,默认 180)
    pub fn horizon_days(&self) -> f64 {
        self.get_numeric_or(KEY_HORIZON_DAYS, DEFAULT_HORIZON_DAYS)
    }

    /// 高优先级窗口 (天,默认 90)
    pub fn high_priority_window_days(&self) -> i64 {
        self.get_numeric_or(
            KEY_HIGH_PRIORITY_WINDOW_DAYS,
            DEFAULT_HIGH_PRIORITY_WINDOW_DAYS,
        )
    }

    /// 成本核算参数 (工资负担系数/月基准工时/油价)
    pub fn cost_params(&self) -> CostParams {
        CostParams {
            payroll_burden_factor: self
                .get_numeric_or(KEY_PAYROLL_BURDEN_FACTOR, DEFAULT_PAYROLL_BURDEN_FACTOR),
            reference_month_hours: self
                .get_numeric_or(KEY_REFERENCE_MONTH_HOURS, DEFAULT_REFERENCE_MONTH_HOURS),
            fuel_price_per_liter: self
                .get_numeric_or(KEY_FUEL_PRICE_PER_LITER, DEFAULT_FUEL_PRICE_PER_LITER),
        }
    }
}
