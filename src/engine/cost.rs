// ==========================================
// 配方计算引擎 - 成本计算
// ==========================================
// 职责: 原料/人工/制造费用/固定成本汇总与毛利分析
// 不变式: total_cost 精确等于六项分解之和
// ==========================================

use crate::domain::plant::CostParameters;
use crate::domain::process::Bom;
use crate::domain::result::{CostRollup, ScaledIngredient};
use tracing::instrument;

// ==========================================
// 成本警告阈值
// ==========================================
const GROSS_MARGIN_WARN_PCT: f64 = 20.0;
const RAW_MATERIALS_SHARE_WARN: f64 = 0.70;
const LABOR_SHARE_WARN: f64 = 0.40;

// ==========================================
// CostCalculator - 成本计算器
// ==========================================
pub struct CostCalculator;

impl CostCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 成本汇总
    ///
    /// # 参数
    /// - ingredients: 取整后原料 (原料成本 = Σ unit_cost × rounded_quantity,
    ///   已在 ScaledIngredient.cost 中)
    /// - bom: 工序清单 (人工成本; 无 BOM 人工按 0 计)
    /// - params: 成本参数
    /// - batch_size: 目标批量 (cost_per_unit 分母)
    /// - byproduct_value: 副产物估值合计 (净成本扣减项)
    /// - warnings: 成本警告追加到此列表
    #[instrument(skip_all, fields(batch_size = batch_size))]
    pub fn rollup(
        &self,
        ingredients: &[ScaledIngredient],
        bom: Option<&Bom>,
        params: &CostParameters,
        batch_size: f64,
        byproduct_value: f64,
        warnings: &mut Vec<String>,
    ) -> CostRollup {
        let raw_materials_cost: f64 = ingredients.iter().map(|i| i.cost).sum();

        // 人工 = Σ 工序归一化工时 × 时薪; 无 BOM 为 0
        let labor_cost = match bom {
            Some(bom) => {
                let hours: f64 = bom.steps.iter().map(|s| s.duration_hours()).sum();
                hours * params.labor_rate_per_hour
            }
            None => 0.0,
        };

        let overhead_cost = raw_materials_cost * params.overhead_rate_pct / 100.0;

        let total_cost = raw_materials_cost
            + labor_cost
            + overhead_cost
            + params.packaging_cost
            + params.energy_cost
            + params.shipping_cost;

        // 除零防护
        let cost_per_unit = if batch_size > 0.0 {
            total_cost / batch_size
        } else {
            0.0
        };

        let target_price = cost_per_unit * (1.0 + params.markup_pct / 100.0);
        let contribution_margin = target_price - cost_per_unit;
        let gross_margin_pct = if target_price > 0.0 {
            contribution_margin / target_price * 100.0
        } else {
            0.0
        };
        let break_even_volume = if contribution_margin > 0.0 {
            Some(overhead_cost / contribution_margin)
        } else {
            None
        };

        // ==========================================
        // 成本警告
        // ==========================================
        if gross_margin_pct < GROSS_MARGIN_WARN_PCT {
            warnings.push(format!(
                "Gross margin {:.1}% is below {:.0}% threshold",
                gross_margin_pct, GROSS_MARGIN_WARN_PCT
            ));
        }
        if total_cost > 0.0 {
            if raw_materials_cost / total_cost > RAW_MATERIALS_SHARE_WARN {
                warnings.push(format!(
                    "Raw materials are {:.1}% of total cost (>70%) - review sourcing or alternatives",
                    raw_materials_cost / total_cost * 100.0
                ));
            }
            if labor_cost / total_cost > LABOR_SHARE_WARN {
                warnings.push(format!(
                    "Labor is {:.1}% of total cost (>40%) - review process durations",
                    labor_cost / total_cost * 100.0
                ));
            }
        }

        CostRollup {
            raw_materials_cost,
            labor_cost,
            overhead_cost,
            packaging_cost: params.packaging_cost,
            energy_cost: params.energy_cost,
            shipping_cost: params.shipping_cost,
            total_cost,
            cost_per_unit,
            target_price,
            gross_margin_pct,
            contribution_margin,
            break_even_volume,
            net_cost: total_cost - byproduct_value,
        }
    }
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new()
    }
}
