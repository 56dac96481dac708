// ==========================================
// 医疗设备DSS - 备件目录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: part / part_model_compat / stock_policy_tier / inventory 的只读访问
// 加载期校验: 档位区间重叠检测、库存数值防御性读取
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::part::{InventoryRecord, Part, PartCompatibility, StockPolicyTier};
use crate::domain::types::Criticality;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ==========================================
// PartCatalogRepository - 备件目录仓储
// ==========================================
/// 备件目录仓储
/// 职责: 读取备件、兼容关系、库存策略档位与当前库存
pub struct PartCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartCatalogRepository {
    /// 创建新的 PartCatalogRepository 实例
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

    /// 读取全部备件
    ///
    /// # 说明
    /// - 未知关键度按 LOW 处理并告警
    pub fn list_parts(&self) -> RepositoryResult<Vec<Part>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, description, category, criticality FROM part ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            let crit_raw: String = row.get(3)?;
            Ok((
                Part {
                    part_id: row.get(0)?,
                    description: row.get(1)?,
                    category: row.get(2)?,
                    criticality: Criticality::parse(&crit_raw).unwrap_or(Criticality::Low),
                },
                crit_raw,
            ))
        })?;

        let mut parts = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            let (part, crit_raw) = row?;
            if Criticality::parse(&crit_raw).is_none() {
                tracing::warn!(
                    "备件 {} 的关键度非法: {:?},按 LOW 处理",
                    part.part_id,
                    crit_raw
                );
            }
            if !seen.insert(part.part_id.clone()) {
                return Err(RepositoryError::ValidationError(format!(
                    "part 主键重复: {}",
                    part.part_id
                )));
            }
            parts.push(part);
        }

        Ok(parts)
    }

    /// 读取备件-型号兼容关系 (保持来源顺序)
    pub fn list_compatibility(&self) -> RepositoryResult<Vec<PartCompatibility>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT part_id, model_id FROM part_model_compat ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(PartCompatibility {
                part_id: row.get(0)?,
                model_id: row.get(1)?,
            })
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(pairs)
    }

    /// 读取库存策略档位 (保持来源顺序)
    ///
    /// # 加载期校验
    /// - 同一备件的档位区间重叠时输出告警,匹配仍按来源顺序先到先得,
    ///   保证结果确定性 (重叠属数据录入问题,不阻断看板)
    pub fn list_policy_tiers(&self) -> RepositoryResult<Vec<StockPolicyTier>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, part_id, units_min, units_max, min_stock
            FROM stock_policy_tier
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(StockPolicyTier {
                tier_id: row.get(0)?,
                part_id: row.get(1)?,
                units_min: row.get(2)?,
                units_max: row.get(3)?,
                min_stock: row.get(4)?,
            })
        })?;

        let mut tiers = Vec::new();
        for row in rows {
            tiers.push(row?);
        }

        Self::warn_on_overlapping_tiers(&tiers);

        Ok(tiers)
    }

    /// 同备件档位区间重叠检测
    fn warn_on_overlapping_tiers(tiers: &[StockPolicyTier]) {
        let mut by_part: HashMap<&str, Vec<&StockPolicyTier>> = HashMap::new();
        for tier in tiers {
            by_part.entry(tier.part_id.as_str()).or_default().push(tier);
        }

        for (part_id, part_tiers) in &by_part {
            for (i, a) in part_tiers.iter().enumerate() {
                for b in part_tiers.iter().skip(i + 1) {
                    if a.overlaps(b) {
                        tracing::warn!(
                            "备件 {} 的库存策略档位区间重叠: {} 与 {},匹配按来源顺序先到先得",
                            part_id,
                            a.tier_id,
                            b.tier_id
                        );
                    }
                }
            }
        }
    }

    /// 读取当前库存
    ///
    /// # 说明
    /// - current_stock 允许 INTEGER/REAL/可解析的 TEXT,其余值按 0 处理并告警
    /// - 缺行的备件由上层按库存 0 处理
    pub fn list_inventory(&self) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT part_id, current_stock FROM inventory ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            let stock = match row.get_ref(1)? {
                ValueRef::Integer(v) => Some(v as f64),
                ValueRef::Real(v) => Some(v),
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .ok()
                    .and_then(|s| s.trim().parse::<f64>().ok()),
                _ => None,
            };
            Ok((row.get::<_, String>(0)?, stock))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (part_id, stock) = row?;
            let current_stock = match stock {
                Some(v) if v.is_finite() => v,
                _ => {
                    tracing::warn!("备件 {} 的库存值无法数值化,按 0 处理", part_id);
                    0.0
                }
            };
            records.push(InventoryRecord {
                part_id,
                current_stock,
            });
        }

        Ok(records)
    }
}
