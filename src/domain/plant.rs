// ==========================================
// 配方计算引擎 - 工厂约束与成本参数
// ==========================================
// 职责: 密度表 / 取整规则 / 批量与设备约束 / 成本参数
// 红线: 取整规则按声明顺序首次命中, 不引入隐式优先级
// ==========================================

use crate::domain::types::DensityUnit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// DensityEntry - 密度表条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityEntry {
    pub density: f64,
    pub unit: DensityUnit,
    /// 测定温度 (°C, 可选)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// 测定条件说明 (可选)
    #[serde(default)]
    pub conditions: Option<String>,
}

impl DensityEntry {
    /// 归一化为 kg/L 数值
    pub fn density_kg_per_l(&self) -> f64 {
        self.density * self.unit.to_kg_per_l_factor()
    }
}

/// 密度表: 原料名 → 密度条目 (查询大小写不敏感)
pub type DensityMap = HashMap<String, DensityEntry>;

// ==========================================
// RoundingRule - 取整规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingRule {
    /// 原料名匹配模式 (大小写不敏感子串); None 表示不限原料
    #[serde(default)]
    pub ingredient_pattern: Option<String>,
    /// 激活阈值: 预取整数量 ≥ 此值时规则才生效
    pub min_quantity: f64,
    /// 取整增量 (命中后向最近倍数取整, 且结果不低于此值)
    pub round_to_nearest: f64,
    #[serde(default)]
    pub unit: String,
}

// ==========================================
// PlantConstraints - 工厂约束
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlantConstraints {
    /// 取整规则 (有序, 首次命中生效)
    #[serde(default)]
    pub rounding_rules: Vec<RoundingRule>,
    #[serde(default)]
    pub min_batch_size: Option<f64>,
    #[serde(default)]
    pub max_batch_size: Option<f64>,
    /// 设备产能: 设备名 → 单批最大处理量
    #[serde(default)]
    pub equipment_capacity: HashMap<String, f64>,
}

// ==========================================
// CostParameters - 成本参数
// ==========================================
// Default 全零: 未提供参数时总成本即原料成本
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostParameters {
    /// 制造费用率 (% of 原料成本)
    #[serde(default)]
    pub overhead_rate_pct: f64,
    /// 人工时薪
    #[serde(default)]
    pub labor_rate_per_hour: f64,
    /// 能源固定成本
    #[serde(default)]
    pub energy_cost: f64,
    /// 包装固定成本
    #[serde(default)]
    pub packaging_cost: f64,
    /// 运输固定成本
    #[serde(default)]
    pub shipping_cost: f64,
    /// 加价率 (%)
    #[serde(default)]
    pub markup_pct: f64,
}
