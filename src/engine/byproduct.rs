// ==========================================
// 配方计算引擎 - 副产物分析
// ==========================================
// 职责: 由损耗推导废弃/可回收/可销售/危险品流
// 输入: 收率链 + BOM + 放大后原料
// 输出: ByproductAnalysis (明细 + 汇总 + 建议)
// 红线: 链推导与 BOM 推导两路独立, 结果直接拼接
//       不去重 — 既定并集口径, 非意外重复
// ==========================================

use crate::domain::formulation::Ingredient;
use crate::domain::process::Bom;
use crate::domain::result::{Byproduct, ByproductAnalysis, YieldChainStep};
use crate::domain::types::{ByproductCategory, LossType};
use tracing::instrument;

use super::yield_chain::INITIAL_STEP_NAME;

// ==========================================
// 副产物经济性常数 (单位量口径)
// ==========================================
const VALUE_PER_UNIT_SALEABLE: f64 = 0.50;
const VALUE_PER_UNIT_RECYCLABLE: f64 = 0.05;
const DISPOSAL_COST_PER_UNIT_WASTE: f64 = 0.02;
const DISPOSAL_COST_PER_UNIT_HAZARDOUS: f64 = 0.25;

/// 边角料启发式: function="other" 且占比 < 0.1%
const TRIMMINGS_PERCENTAGE_CEILING: f64 = 0.1;
/// 边角料按放大后数量的 5% 估算
const TRIMMINGS_RATE: f64 = 0.05;
/// 重要性下限: 低于 0.01 单位的流不生成
const MATERIALITY_FLOOR: f64 = 0.01;

// ==========================================
// ByproductAnalyzer - 副产物分析器
// ==========================================
pub struct ByproductAnalyzer;

impl ByproductAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 完整副产物分析
    ///
    /// # 参数
    /// - yield_chain: 已完成的收率链
    /// - bom: 工序清单 (有 BOM 时额外跑 BOM 级推导)
    /// - ingredients: 原料及放大后数量 (边角料启发式)
    /// - scale_factor: 放大系数 (BOM waste 字段为基准口径)
    /// - total_input: 总投入量 (waste_pct 分母)
    /// - unit: 输出单位
    #[instrument(skip_all, fields(chain_len = yield_chain.len(), total_input = total_input))]
    pub fn analyze(
        &self,
        yield_chain: &[YieldChainStep],
        bom: Option<&Bom>,
        ingredients: &[(Ingredient, f64)],
        scale_factor: f64,
        total_input: f64,
        unit: &str,
    ) -> ByproductAnalysis {
        let mut byproducts = self.from_yield_chain(yield_chain, unit);
        byproducts.extend(self.trimmings(ingredients, unit));

        // BOM 级独立推导, 与链推导拼接不去重 (既定并集口径)
        if let Some(bom) = bom {
            byproducts.extend(self.from_bom(bom, scale_factor, unit));
            byproducts.extend(self.trimmings(ingredients, unit));
        }

        let total_waste: f64 = byproducts.iter().map(|b| b.quantity).sum();
        let total_value: f64 = byproducts.iter().map(|b| b.estimated_value).sum();
        let total_disposal_cost: f64 = byproducts.iter().map(|b| b.disposal_cost).sum();
        let waste_pct = if total_input > 0.0 {
            total_waste / total_input * 100.0
        } else {
            0.0
        };

        let recommendations = self.recommend(&byproducts, waste_pct);

        ByproductAnalysis {
            byproducts,
            total_waste,
            total_value,
            total_disposal_cost,
            waste_pct,
            recommendations,
        }
    }

    // ==========================================
    // 链推导: 非初始节点的实际损耗
    // ==========================================
    fn from_yield_chain(&self, yield_chain: &[YieldChainStep], unit: &str) -> Vec<Byproduct> {
        yield_chain
            .iter()
            .filter(|s| s.step_name != INITIAL_STEP_NAME && s.loss_quantity > 0.0)
            .map(|s| {
                let category = Self::categorize(s.loss_type);
                self.build(
                    format!("{} Loss", s.step_name),
                    &s.step_name,
                    s.loss_quantity,
                    unit,
                    category,
                )
            })
            .collect()
    }

    // ==========================================
    // BOM 推导: 直接读工序 yields.waste
    // ==========================================
    fn from_bom(&self, bom: &Bom, scale_factor: f64, unit: &str) -> Vec<Byproduct> {
        bom.steps
            .iter()
            .filter_map(|step| {
                let waste = step.yields.as_ref()?.waste * scale_factor;
                if waste <= 0.0 {
                    return None;
                }
                Some(self.build(
                    format!("{} Loss", step.name),
                    &step.name,
                    waste,
                    unit,
                    ByproductCategory::Waste,
                ))
            })
            .collect()
    }

    // ==========================================
    // 边角料启发式
    // ==========================================
    // function="other" 且占比 <0.1% 的辅料按 5% 估算边角料,
    // 低于重要性下限的不生成
    fn trimmings(&self, ingredients: &[(Ingredient, f64)], unit: &str) -> Vec<Byproduct> {
        ingredients
            .iter()
            .filter(|(ing, _)| {
                ing.function.eq_ignore_ascii_case("other")
                    && ing.percentage < TRIMMINGS_PERCENTAGE_CEILING
            })
            .filter_map(|(ing, scaled_qty)| {
                let qty = scaled_qty * TRIMMINGS_RATE;
                if qty <= MATERIALITY_FLOOR {
                    return None;
                }
                Some(self.build(
                    format!("{} Trimmings", ing.name),
                    &ing.name,
                    qty,
                    unit,
                    ByproductCategory::Recyclable,
                ))
            })
            .collect()
    }

    /// 损耗类型 → 副产物分类
    ///
    /// evaporation/moisture → waste; process/transfer → recyclable;
    /// 显式 waste → waste; 无类型 (推导损耗) → waste
    fn categorize(loss_type: Option<LossType>) -> ByproductCategory {
        match loss_type {
            Some(LossType::Process) | Some(LossType::Transfer) => ByproductCategory::Recyclable,
            Some(LossType::Evaporation) | Some(LossType::Moisture) | Some(LossType::Waste) => {
                ByproductCategory::Waste
            }
            None => ByproductCategory::Waste,
        }
    }

    /// 按来源名模式给出回收建议
    fn suggest_recovery(source: &str, category: ByproductCategory) -> String {
        let lower = source.to_lowercase();
        if lower.contains("filter") || lower.contains("filtrat") {
            return "Composting or animal feed".to_string();
        }
        if lower.contains("concentrate") || lower.contains("evaporat") {
            return "Water recovery for reuse".to_string();
        }
        match category {
            ByproductCategory::Recyclable => "Evaluate for reprocessing".to_string(),
            ByproductCategory::Saleable => "Market as secondary product".to_string(),
            ByproductCategory::Hazardous => "Licensed hazardous disposal".to_string(),
            ByproductCategory::Waste => "Standard disposal".to_string(),
        }
    }

    fn build(
        &self,
        name: String,
        source_step: &str,
        quantity: f64,
        unit: &str,
        category: ByproductCategory,
    ) -> Byproduct {
        let (value_rate, disposal_rate) = match category {
            ByproductCategory::Saleable => (VALUE_PER_UNIT_SALEABLE, 0.0),
            ByproductCategory::Recyclable => (VALUE_PER_UNIT_RECYCLABLE, 0.0),
            ByproductCategory::Waste => (0.0, DISPOSAL_COST_PER_UNIT_WASTE),
            ByproductCategory::Hazardous => (0.0, DISPOSAL_COST_PER_UNIT_HAZARDOUS),
        };
        Byproduct {
            recovery_suggestion: Self::suggest_recovery(source_step, category),
            name,
            source_step: source_step.to_string(),
            quantity,
            unit: unit.to_string(),
            category,
            estimated_value: quantity * value_rate,
            disposal_cost: quantity * disposal_rate,
        }
    }

    // ==========================================
    // 建议生成 (固定阈值)
    // ==========================================
    fn recommend(&self, byproducts: &[Byproduct], waste_pct: f64) -> Vec<String> {
        let mut recs = Vec::new();

        if waste_pct > 15.0 {
            recs.push(format!(
                "Waste percentage {:.1}% exceeds 15% - optimize process steps to reduce losses",
                waste_pct
            ));
        }
        if byproducts.iter().any(|b| b.category == ByproductCategory::Recyclable) {
            recs.push("Recyclable streams present - set up recovery to offset material cost".to_string());
        }
        if byproducts.iter().any(|b| b.category == ByproductCategory::Saleable) {
            recs.push("Saleable byproducts present - evaluate secondary market channels".to_string());
        }
        if byproducts.iter().any(|b| b.category == ByproductCategory::Hazardous) {
            recs.push("Hazardous streams present - follow licensed disposal protocols".to_string());
        }
        for b in byproducts {
            if b.quantity > 10.0 {
                recs.push(format!(
                    "Stream '{}' exceeds 10 units ({:.1}) - prioritize for reduction",
                    b.name, b.quantity
                ));
            }
        }

        recs
    }
}

impl Default for ByproductAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
