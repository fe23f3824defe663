// ==========================================
// 配方计算引擎 - 计算请求与结果实体
// ==========================================
// 职责: calculate() 的边界结构
// 红线: 结果记录均为单次调用内的全新值,
//       无持久身份, 不回写输入
// ==========================================

use crate::domain::formulation::{Formulation, NutrientProfile};
use crate::domain::plant::{CostParameters, DensityMap, PlantConstraints};
use crate::domain::process::{Bom, LossModel};
use crate::domain::types::{Assumption, ByproductCategory, LossType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// CalculationRequest - 计算请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub formulation: Formulation,
    #[serde(default)]
    pub bom: Option<Bom>,
    /// 目标批量
    pub target_batch_size: f64,
    /// 目标单位 (产线口径)
    pub target_unit: String,
    /// 请求收率 (%), 100 表示不做目标收率调整
    pub yield_percentage: f64,
    /// 损耗模型 (有序)
    #[serde(default)]
    pub loss_models: Vec<LossModel>,
    /// 请求级覆写: 密度表
    #[serde(default)]
    pub density_map: Option<DensityMap>,
    /// 请求级覆写: 工厂约束
    #[serde(default)]
    pub plant_constraints: Option<PlantConstraints>,
    /// 请求级覆写: 成本参数
    #[serde(default)]
    pub cost_parameters: Option<CostParameters>,
}

// ==========================================
// ScaledIngredient - 放大后原料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledIngredient {
    pub name: String,
    pub original_quantity: f64,
    pub original_unit: String,
    pub percentage: f64,
    /// 放大后连续数量 (目标单位口径)
    pub scaled_quantity: f64,
    /// 取整后生产数量 (目标单位口径)
    pub rounded_quantity: f64,
    pub unit: String,
    /// 取整口径成本 (unit_cost × rounded_quantity)
    pub cost: f64,
    /// 密度兜底标记: 跨族换算时密度表未命中
    pub density_assumed: bool,
}

// ==========================================
// YieldChainStep - 收率链节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldChainStep {
    pub step_name: String,
    pub input_quantity: f64,
    pub output_quantity: f64,
    pub loss_quantity: f64,
    /// 本步损耗率 (%)
    pub loss_pct: f64,
    /// 本步收率 (%)
    pub step_yield_pct: f64,
    /// 累计收率 (%), 单调不增且限定在 [0,100]
    pub cumulative_yield_pct: f64,
    /// 命中损耗模型时的损耗类型 (推导损耗无类型)
    pub loss_type: Option<LossType>,
    /// 合成节点标记 (Target Yield Adjustment 为对账条目, 非物理工序)
    pub synthetic: bool,
}

// ==========================================
// Byproduct - 副产物流
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Byproduct {
    pub name: String,
    pub source_step: String,
    pub quantity: f64,
    pub unit: String,
    pub category: ByproductCategory,
    pub recovery_suggestion: String,
    pub estimated_value: f64,
    pub disposal_cost: f64,
}

// ==========================================
// ByproductAnalysis - 副产物分析汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ByproductAnalysis {
    pub byproducts: Vec<Byproduct>,
    /// 全部副产物数量合计
    pub total_waste: f64,
    pub total_value: f64,
    pub total_disposal_cost: f64,
    /// total_waste / 总投入量 × 100
    pub waste_pct: f64,
    pub recommendations: Vec<String>,
}

// ==========================================
// CostRollup - 成本汇总
// ==========================================
// 不变式: total_cost 精确等于六项分解之和
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostRollup {
    pub raw_materials_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub packaging_cost: f64,
    pub energy_cost: f64,
    pub shipping_cost: f64,
    pub total_cost: f64,
    pub cost_per_unit: f64,
    pub target_price: f64,
    pub gross_margin_pct: f64,
    pub contribution_margin: f64,
    /// 盈亏平衡量 (contribution_margin ≤ 0 时无定义)
    pub break_even_volume: Option<f64>,
    /// 净成本 = total_cost − 副产物估值合计
    pub net_cost: f64,
}

/// 聚合营养: 与单料营养表同构, 口径为 "每 100 单位产出"
pub type AggregatedNutrition = NutrientProfile;

// ==========================================
// CalculationMetadata - 计算元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationMetadata {
    pub calculation_id: Uuid,
    pub calculated_at: DateTime<Utc>,
    pub engine_version: String,
    pub scale_factor: f64,
    /// 本次计算使用的兜底假设 (显式留痕)
    pub assumptions: Vec<Assumption>,
}

// ==========================================
// CalculationResult - 计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub scaled_ingredients: Vec<ScaledIngredient>,
    pub yield_chain: Vec<YieldChainStep>,
    pub byproducts: ByproductAnalysis,
    pub nutrition: AggregatedNutrition,
    pub cost: CostRollup,
    /// 收率链末端产出量 (链为空时等于目标批量)
    pub total_output: f64,
    pub output_unit: String,
    /// total_output / target_batch_size × 100
    pub actual_yield_pct: f64,
    /// 0–100 综合效率分 (收率/成本/警告加权)
    pub efficiency_score: u32,
    pub warnings: Vec<String>,
    pub metadata: CalculationMetadata,
}
