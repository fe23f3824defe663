// ==========================================
// 配方计算引擎 - 引擎编排器
// ==========================================
// 用途: 协调各核心引擎的执行顺序,
//       单次 calculate(request) 产出完整结果
// 红线: 仅非法单位名中止计算; 其余异常一律降级
//       为 warning/assumption; 不修改调用方输入
// ==========================================

use crate::config::EngineConfig;
use crate::domain::result::{
    CalculationMetadata, CalculationRequest, CalculationResult, ScaledIngredient,
};
use crate::domain::types::Assumption;
use crate::engine::byproduct::ByproductAnalyzer;
use crate::engine::cost::CostCalculator;
use crate::engine::density::DensityResolver;
use crate::engine::nutrition::NutritionAggregator;
use crate::engine::rounding::RoundingEngine;
use crate::engine::unit::Unit;
use crate::engine::yield_chain::YieldChainCalculator;
use crate::error::CalcResult;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// 编排阈值
// ==========================================
/// 基准兜底值: target_yield 非正时按 100 单位基准
const DEFAULT_BASIS: f64 = 100.0;
const LOW_YIELD_WARN_PCT: f64 = 80.0;
const SCALE_FACTOR_HIGH_WARN: f64 = 100.0;
const SCALE_FACTOR_LOW_WARN: f64 = 0.1;

// ==========================================
// CalculationEngine - 引擎编排器
// ==========================================
pub struct CalculationEngine {
    config: EngineConfig,
    yield_chain: YieldChainCalculator,
    byproduct: ByproductAnalyzer,
    cost: CostCalculator,
    nutrition: NutritionAggregator,
    rounding: RoundingEngine,
}

impl CalculationEngine {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 引擎级默认配置 (不可变; 请求级覆写优先)
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            yield_chain: YieldChainCalculator::new(),
            byproduct: ByproductAnalyzer::new(),
            cost: CostCalculator::new(),
            nutrition: NutritionAggregator::new(),
            rounding: RoundingEngine::new(),
        }
    }

    /// 执行完整计算流程
    ///
    /// # 参数
    /// - request: 计算请求 (配方 + 可选 BOM/损耗模型/覆写配置)
    ///
    /// # 返回
    /// 完整计算结果; 仅单位名非法时返回 Err
    #[instrument(skip(self, request), fields(
        formulation = %request.formulation.name,
        target_batch_size = request.target_batch_size,
        target_unit = %request.target_unit,
    ))]
    pub fn calculate(&self, request: &CalculationRequest) -> CalcResult<CalculationResult> {
        info!("开始执行配方计算流程");

        let mut warnings: Vec<String> = Vec::new();
        let mut assumptions: Vec<Assumption> = Vec::new();

        // 目标单位解析失败即整次中止 (唯一硬失败)
        let target_unit = Unit::parse(&request.target_unit)?;

        // 请求级覆写优先于引擎默认
        let density_map = request
            .density_map
            .as_ref()
            .unwrap_or(&self.config.density_map);
        let plant_constraints = request
            .plant_constraints
            .as_ref()
            .unwrap_or(&self.config.plant_constraints);
        let cost_parameters = request
            .cost_parameters
            .as_ref()
            .unwrap_or(&self.config.cost_parameters);
        let resolver = DensityResolver::new(density_map);

        // ==========================================
        // 步骤1: 放大系数
        // ==========================================
        let basis = if request.formulation.target_yield > 0.0 {
            request.formulation.target_yield
        } else {
            assumptions.push(Assumption::BasisDefaulted);
            DEFAULT_BASIS
        };
        let scale_factor = request.target_batch_size / basis;
        debug!(scale_factor, "步骤1: 放大系数");

        if request.bom.is_none() {
            assumptions.push(Assumption::MissingBom);
        }

        // ==========================================
        // 步骤2: 收率链
        // ==========================================
        let total_scaled_input =
            request.formulation.total_ingredient_quantity() * scale_factor;
        let yield_chain = self.yield_chain.trace(
            total_scaled_input,
            request.bom.as_ref(),
            &request.loss_models,
            request.yield_percentage,
        );
        debug!(chain_len = yield_chain.len(), "步骤2: 收率链完成");

        // 请求收率高于可达累计收率时无法向下对账, 降级为警告
        if let Some(last) = yield_chain.last() {
            if request.yield_percentage < 100.0
                && request.yield_percentage > last.cumulative_yield_pct + 1e-9
            {
                warnings.push(format!(
                    "Requested yield {:.1}% exceeds achievable cumulative yield {:.1}%",
                    request.yield_percentage, last.cumulative_yield_pct
                ));
            }
        }

        // ==========================================
        // 步骤3+4: 原料放大 + 工厂约束取整
        // ==========================================
        let mut scaled_ingredients = Vec::with_capacity(request.formulation.ingredients.len());
        for ingredient in &request.formulation.ingredients {
            let ing_unit = Unit::parse(&ingredient.unit)?;
            let scaled = ingredient.quantity * scale_factor;

            // 单位族不同经密度桥接, 同族直接换算
            let (scaled_in_target, density_assumed) =
                resolver.bridge(scaled, ing_unit, target_unit, &ingredient.name)?;
            if density_assumed {
                assumptions.push(Assumption::DensityDefaulted {
                    ingredient: ingredient.name.clone(),
                });
            }

            let rounded = self.rounding.round(
                &ingredient.name,
                scaled_in_target,
                &plant_constraints.rounding_rules,
            );

            scaled_ingredients.push(ScaledIngredient {
                name: ingredient.name.clone(),
                original_quantity: ingredient.quantity,
                original_unit: ingredient.unit.clone(),
                percentage: ingredient.percentage,
                scaled_quantity: scaled_in_target,
                rounded_quantity: rounded,
                unit: request.target_unit.clone(),
                cost: ingredient.unit_cost * rounded,
                density_assumed,
            });
        }
        debug!(count = scaled_ingredients.len(), "步骤3+4: 原料放大与取整完成");

        // ==========================================
        // 步骤5: 副产物分析
        // ==========================================
        let ingredient_pairs: Vec<_> = request
            .formulation
            .ingredients
            .iter()
            .cloned()
            .zip(scaled_ingredients.iter().map(|s| s.scaled_quantity))
            .collect();
        let byproducts = self.byproduct.analyze(
            &yield_chain,
            request.bom.as_ref(),
            &ingredient_pairs,
            scale_factor,
            total_scaled_input,
            &request.target_unit,
        );
        debug!(
            byproduct_count = byproducts.byproducts.len(),
            waste_pct = byproducts.waste_pct,
            "步骤5: 副产物分析完成"
        );

        // ==========================================
        // 步骤6: 营养聚合
        // ==========================================
        let nutrition = self
            .nutrition
            .aggregate(&request.formulation.ingredients, &scaled_ingredients);
        debug!("步骤6: 营养聚合完成");

        // ==========================================
        // 步骤7: 成本汇总 (净成本扣减副产物估值)
        // ==========================================
        let cost = self.cost.rollup(
            &scaled_ingredients,
            request.bom.as_ref(),
            cost_parameters,
            request.target_batch_size,
            byproducts.total_value,
            &mut warnings,
        );
        debug!(total_cost = cost.total_cost, "步骤7: 成本汇总完成");

        // ==========================================
        // 步骤8+9: 产出与实际收率
        // ==========================================
        let total_output = yield_chain
            .last()
            .map(|s| s.output_quantity)
            .unwrap_or(request.target_batch_size);
        let actual_yield_pct = if request.target_batch_size > 0.0 {
            total_output / request.target_batch_size * 100.0
        } else {
            0.0
        };

        // ==========================================
        // 步骤10: 工厂约束与质量警告
        // ==========================================
        self.check_plant_constraints(request, plant_constraints, &yield_chain, &mut warnings);

        if actual_yield_pct < LOW_YIELD_WARN_PCT {
            warnings.push(format!(
                "Actual yield {:.1}% is below {:.0}% threshold",
                actual_yield_pct, LOW_YIELD_WARN_PCT
            ));
        }
        if scale_factor > SCALE_FACTOR_HIGH_WARN {
            warnings.push(format!(
                "Scale factor {:.1} exceeds {:.0}x - verify plant capacity before production",
                scale_factor, SCALE_FACTOR_HIGH_WARN
            ));
        }
        if scale_factor < SCALE_FACTOR_LOW_WARN {
            warnings.push(format!(
                "Scale factor {:.3} is below {} - lab-scale quantities may not be practical",
                scale_factor, SCALE_FACTOR_LOW_WARN
            ));
        }

        // ==========================================
        // 步骤11: 效率评分 (在完整警告清单上计算)
        // ==========================================
        let efficiency_score =
            Self::efficiency_score(actual_yield_pct, cost.cost_per_unit, warnings.len());

        info!(
            total_output,
            actual_yield_pct,
            efficiency_score,
            warning_count = warnings.len(),
            "配方计算流程完成"
        );

        Ok(CalculationResult {
            scaled_ingredients,
            yield_chain,
            byproducts,
            nutrition,
            cost,
            total_output,
            output_unit: request.target_unit.clone(),
            actual_yield_pct,
            efficiency_score,
            warnings,
            metadata: CalculationMetadata {
                calculation_id: Uuid::new_v4(),
                calculated_at: Utc::now(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                scale_factor,
                assumptions,
            },
        })
    }

    // ==========================================
    // 工厂约束校验 (批量边界 + 设备产能)
    // ==========================================
    fn check_plant_constraints(
        &self,
        request: &CalculationRequest,
        constraints: &crate::domain::plant::PlantConstraints,
        yield_chain: &[crate::domain::result::YieldChainStep],
        warnings: &mut Vec<String>,
    ) {
        if let Some(min) = constraints.min_batch_size {
            if request.target_batch_size < min {
                warnings.push(format!(
                    "Batch size {:.1} is below plant minimum {:.1}",
                    request.target_batch_size, min
                ));
            }
        }
        if let Some(max) = constraints.max_batch_size {
            if request.target_batch_size > max {
                warnings.push(format!(
                    "Batch size {:.1} exceeds plant maximum {:.1}",
                    request.target_batch_size, max
                ));
            }
        }

        // 设备产能: 工序投入量超过设备单批处理量时告警
        let Some(bom) = request.bom.as_ref() else {
            return;
        };
        for step in &bom.steps {
            if step.equipment.is_empty() {
                continue;
            }
            let Some(&capacity) = constraints.equipment_capacity.get(&step.equipment) else {
                continue;
            };
            let Some(node) = yield_chain.iter().find(|n| n.step_name == step.name) else {
                continue;
            };
            if node.input_quantity > capacity {
                warnings.push(format!(
                    "Step '{}' input {:.1} exceeds equipment '{}' capacity {:.1}",
                    step.name, node.input_quantity, step.equipment, capacity
                ));
            }
        }
    }

    /// 综合效率分: 收率 50% + 成本 30% + 警告 20%
    fn efficiency_score(actual_yield_pct: f64, cost_per_unit: f64, warning_count: usize) -> u32 {
        let yield_component = 0.5 * actual_yield_pct / 100.0;
        let cost_component = 0.3 * (1.0 / (cost_per_unit + 1.0)).min(1.0);
        let warning_component = 0.2 * (1.0 - 0.1 * warning_count as f64).max(0.0);
        let score = 100.0 * (yield_component + cost_component + warning_component);
        score.round().clamp(0.0, 100.0) as u32
    }
}
