// ==========================================
// 医疗设备DSS - 备件库存策略解析引擎
// ==========================================
// 职责: 档位策略匹配与库存缺口计算
// 输入: 在装设备 + 型号目录 + 备件目录 + 兼容关系 + 策略档位 + 当前库存
// 输出: StockDeficit (每个有策略需求的备件一行)
// ==========================================
// 匹配规则:
// - 装机数按型号统计,只计在役设备
// - 同一 (备件,型号) 对取来源顺序上第一个命中的档位
// - 无命中档位的对不参与需求累加 (策略覆盖缺口,非错误)
// ==========================================

use crate::domain::equipment::{EquipmentUnit, Model};
use crate::domain::indicators::StockDeficit;
use crate::domain::part::{InventoryRecord, Part, PartCompatibility, StockPolicyTier};
use std::collections::{BTreeSet, HashMap};

// ==========================================
// StockPolicyResolver - 库存策略解析器
// ==========================================
pub struct StockPolicyResolver {
    // 无状态引擎,不需要注入依赖
}

impl Default for StockPolicyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// 单个备件的需求累加中间结果
struct PartRequirement {
    required_stock: f64,
    model_names: BTreeSet<String>,
}

impl StockPolicyResolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 解析全部备件的库存缺口 (完整策略报表)
    ///
    /// # 参数
    /// - `units`: 在装设备列表
    /// - `models`: 型号ID到型号的映射
    /// - `parts`: 备件目录 (输出顺序按该目录的来源顺序)
    /// - `compatibility`: 备件-型号兼容关系 (来源顺序)
    /// - `tiers`: 库存策略档位 (来源顺序,先到先得)
    /// - `inventory`: 当前库存
    ///
    /// # 返回
    /// 所有 required_stock > 0 的备件,无论缺口正负。
    /// 全部型号均无命中档位时返回空表,调用方视为"完全合规"。
    pub fn resolve_all(
        &self,
        units: &[EquipmentUnit],
        models: &HashMap<String, Model>,
        parts: &[Part],
        compatibility: &[PartCompatibility],
        tiers: &[StockPolicyTier],
        inventory: &[InventoryRecord],
    ) -> Vec<StockDeficit> {
        // 1. 型号维度的在役装机数
        let installed_counts = self.count_installed_units(units);

        // 2. 档位按备件分组 (保持来源顺序)
        let mut tiers_by_part: HashMap<&str, Vec<&StockPolicyTier>> = HashMap::new();
        for tier in tiers {
            tiers_by_part.entry(tier.part_id.as_str()).or_default().push(tier);
        }

        // 3. 逐个兼容对累加需求
        let mut requirements: HashMap<&str, PartRequirement> = HashMap::new();
        for pair in compatibility {
            let installed = match installed_counts.get(pair.model_id.as_str()) {
                Some(&n) if n > 0 => n,
                _ => continue, // 无在役装机,不产生需求
            };

            let matched = tiers_by_part
                .get(pair.part_id.as_str())
                .and_then(|part_tiers| {
                    part_tiers.iter().find(|t| t.contains(installed)).copied()
                });

            let tier = match matched {
                Some(t) => t,
                None => {
                    // 策略覆盖缺口: 静默排除,仅留痕
                    tracing::debug!(
                        "备件 {} 在型号 {} (装机数 {}) 下无命中档位",
                        pair.part_id,
                        pair.model_id,
                        installed
                    );
                    continue;
                }
            };

            let model_name = models
                .get(&pair.model_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| pair.model_id.clone());

            let entry = requirements
                .entry(pair.part_id.as_str())
                .or_insert_with(|| PartRequirement {
                    required_stock: 0.0,
                    model_names: BTreeSet::new(),
                });
            entry.required_stock += tier.min_stock;
            entry.model_names.insert(model_name);
        }

        // 4. 当前库存映射 (缺行按 0)
        let stock_by_part: HashMap<&str, f64> = inventory
            .iter()
            .map(|r| (r.part_id.as_str(), r.current_stock))
            .collect();

        // 5. 组装输出 (顺序跟随备件目录)
        let mut result = Vec::new();
        for part in parts {
            let req = match requirements.get(part.part_id.as_str()) {
                Some(r) if r.required_stock > 0.0 => r,
                _ => continue,
            };

            let current_stock = stock_by_part
                .get(part.part_id.as_str())
                .copied()
                .unwrap_or(0.0);
            let deficit = (req.required_stock - current_stock).max(0.0);

            result.push(StockDeficit {
                part_id: part.part_id.clone(),
                description: part.description.clone(),
                category: part.category.clone(),
                criticality: part.criticality,
                required_stock: req.required_stock,
                current_stock,
                deficit,
                associated_models: req
                    .model_names
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        result
    }

    /// 仅返回需要采购动作的备件 (缺口 > 0)
    pub fn resolve_needs_action(
        &self,
        units: &[EquipmentUnit],
        models: &HashMap<String, Model>,
        parts: &[Part],
        compatibility: &[PartCompatibility],
        tiers: &[StockPolicyTier],
        inventory: &[InventoryRecord],
    ) -> Vec<StockDeficit> {
        self.resolve_all(units, models, parts, compatibility, tiers, inventory)
            .into_iter()
            .filter(|d| d.needs_action())
            .collect()
    }

    // ==========================================
    // 指标计算
    // ==========================================

    /// 型号维度的在役装机数
    ///
    /// # 说明
    /// 只统计 ACTIVE 状态设备: 退役设备不再驱动备件需求。
    /// (历史实现曾存在"全量计数/在役计数"两条路径,此处统一为在役计数)
    fn count_installed_units<'a>(&self, units: &'a [EquipmentUnit]) -> HashMap<&'a str, i64> {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for unit in units {
            if unit.is_active() {
                *counts.entry(unit.model_id.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}
