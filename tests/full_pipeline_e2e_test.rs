// ==========================================
// 配方计算全流程 E2E 测试
// ==========================================
// 测试目标: BOM + 损耗模型 + 密度 + 约束 + 成本参数
//           组合下的端到端行为
// 覆盖范围: 兜底留痕 / 副产物并集口径 / 目标收率对账 /
//           营养基准不变性 / 警告与效率分
// ==========================================

use formulation_engine::{
    Assumption, Bom, ByproductCategory, CalculationEngine, CalculationRequest, CostParameters,
    DurationUnit, EngineConfig, Formulation, Ingredient, LossModel, LossType, NutrientProfile,
    PlantConstraints, ProcessStep, StepYields, TARGET_ADJUSTMENT_STEP_NAME,
};
use std::collections::HashMap;

// ==========================================
// 测试辅助函数
// ==========================================

fn nutrient_profile(calories: f64, sugar: f64) -> NutrientProfile {
    let mut vitamins = HashMap::new();
    vitamins.insert("C".to_string(), 30.0);
    NutrientProfile {
        calories,
        protein: 0.5,
        carbohydrates: calories / 4.0,
        fat: 0.1,
        fiber: 0.3,
        sugar,
        sodium: 2.0,
        vitamins,
        minerals: HashMap::new(),
    }
}

fn juice_formulation() -> Formulation {
    Formulation {
        name: "Orange Nectar".to_string(),
        target_yield: 100.0,
        yield_unit: "kg".to_string(),
        ingredients: vec![
            Ingredient {
                name: "orange juice".to_string(),
                quantity: 70.0,
                unit: "kg".to_string(),
                percentage: 70.0,
                function: "base".to_string(),
                unit_cost: 0.9,
                nutrition: Some(nutrient_profile(45.0, 8.4)),
                alternatives: vec!["mandarin juice".to_string()],
            },
            Ingredient {
                name: "water".to_string(),
                quantity: 29.95,
                unit: "kg".to_string(),
                percentage: 29.95,
                function: "base".to_string(),
                unit_cost: 0.01,
                nutrition: None,
                alternatives: vec![],
            },
            Ingredient {
                name: "stabilizer".to_string(),
                quantity: 0.05,
                unit: "kg".to_string(),
                percentage: 0.05,
                function: "other".to_string(),
                unit_cost: 12.0,
                nutrition: None,
                alternatives: vec![],
            },
        ],
    }
}

fn juice_bom() -> Bom {
    Bom {
        name: "Nectar line".to_string(),
        steps: vec![
            ProcessStep {
                name: "Mixing".to_string(),
                duration: 30.0,
                duration_unit: DurationUnit::Minutes,
                equipment: "mixer-01".to_string(),
                yields: None,
            },
            ProcessStep {
                name: "Filtration".to_string(),
                duration: 1.0,
                duration_unit: DurationUnit::Hours,
                equipment: "filter-01".to_string(),
                yields: Some(StepYields {
                    input: 100.0,
                    output: 96.0,
                    waste: 4.0,
                    unit: "kg".to_string(),
                }),
            },
            ProcessStep {
                name: "Pasteurization".to_string(),
                duration: 20.0,
                duration_unit: DurationUnit::Minutes,
                equipment: "past-01".to_string(),
                yields: None,
            },
        ],
    }
}

fn full_request() -> CalculationRequest {
    CalculationRequest {
        formulation: juice_formulation(),
        bom: Some(juice_bom()),
        target_batch_size: 1000.0,
        target_unit: "kg".to_string(),
        yield_percentage: 90.0,
        loss_models: vec![
            LossModel {
                step_name: "Pasteurization".to_string(),
                loss_type: LossType::Evaporation,
                percentage: 2.0,
            },
            LossModel {
                step_name: "Tank transfer".to_string(),
                loss_type: LossType::Transfer,
                percentage: 1.0,
            },
        ],
        density_map: None,
        plant_constraints: Some(PlantConstraints {
            rounding_rules: vec![],
            min_batch_size: Some(500.0),
            max_batch_size: Some(5000.0),
            equipment_capacity: HashMap::from([
                ("mixer-01".to_string(), 2000.0),
                ("filter-01".to_string(), 800.0), // 故意设小, 触发产能警告
            ]),
        }),
        cost_parameters: Some(CostParameters {
            overhead_rate_pct: 12.0,
            labor_rate_per_hour: 28.0,
            energy_cost: 45.0,
            packaging_cost: 130.0,
            shipping_cost: 60.0,
            markup_pct: 40.0,
        }),
    }
}

fn engine() -> CalculationEngine {
    CalculationEngine::new(EngineConfig::new())
}

// ==========================================
// 测试用例 1: 收率链结构与对账
// ==========================================

#[test]
fn test_yield_chain_structure_and_target_adjustment() {
    let result = engine().calculate(&full_request()).expect("应计算成功");

    let names: Vec<_> = result.yield_chain.iter().map(|s| s.step_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Initial Input",
            "Mixing",
            "Filtration",
            "Pasteurization",
            "Tank transfer",
            TARGET_ADJUSTMENT_STEP_NAME,
        ],
        "BOM 工序 → 未匹配损耗模型 → 对账节点"
    );

    // Mixing 无 yields 无模型: 零损耗
    assert_eq!(result.yield_chain[1].loss_pct, 0.0);
    // Filtration 推导 4%
    assert!((result.yield_chain[2].loss_pct - 4.0).abs() < 1e-9);
    // Pasteurization 命中模型 2% (优先于工序数据)
    assert!((result.yield_chain[3].loss_pct - 2.0).abs() < 1e-9);
    assert_eq!(result.yield_chain[3].loss_type, Some(LossType::Evaporation));

    // 对账节点精确落在 90%
    let last = result.yield_chain.last().unwrap();
    assert!(last.synthetic);
    assert!((last.cumulative_yield_pct - 90.0).abs() < 1e-9);
    assert!((result.total_output - 900.0).abs() < 1e-9, "1000×90% = 900");
    assert!((result.actual_yield_pct - 90.0).abs() < 1e-9);

    // 累计收率单调不增
    let mut prev = 100.0;
    for node in &result.yield_chain {
        assert!(node.cumulative_yield_pct <= prev + 1e-9);
        prev = node.cumulative_yield_pct;
    }
}

// ==========================================
// 测试用例 2: 副产物两路并集口径
// ==========================================

#[test]
fn test_byproduct_union_of_chain_and_bom_passes() {
    let result = engine().calculate(&full_request()).expect("应计算成功");
    let byproducts = &result.byproducts;

    // 链推导: Filtration/Pasteurization/Tank transfer/对账节点损耗
    // BOM 推导: Filtration yields.waste (放大后 4×10=40)
    // 既定口径: Filtration 两路各一条, 不去重
    let filtration_streams: Vec<_> = byproducts
        .byproducts
        .iter()
        .filter(|b| b.source_step == "Filtration")
        .collect();
    assert_eq!(filtration_streams.len(), 2, "链推导与 BOM 推导并集, 不去重");

    // 蒸发损耗归为 waste, 转运损耗归为 recyclable
    let pasteurization = byproducts
        .byproducts
        .iter()
        .find(|b| b.source_step == "Pasteurization")
        .unwrap();
    assert_eq!(pasteurization.category, ByproductCategory::Waste);
    let transfer = byproducts
        .byproducts
        .iter()
        .find(|b| b.source_step == "Tank transfer")
        .unwrap();
    assert_eq!(transfer.category, ByproductCategory::Recyclable);

    // filter 名称模式 → 堆肥/饲料建议
    assert_eq!(filtration_streams[0].recovery_suggestion, "Composting or animal feed");

    // 边角料: stabilizer (other, 0.05% < 0.1%), 5%×0.5 = 0.025 > 0.01
    // BOM 在场时边角料启发式同样跑两遍
    let trimmings: Vec<_> = byproducts
        .byproducts
        .iter()
        .filter(|b| b.name == "stabilizer Trimmings")
        .collect();
    assert_eq!(trimmings.len(), 2, "BOM 在场时边角料也按并集口径出两条");
    assert!((trimmings[0].quantity - 0.025).abs() < 1e-9);

    // 汇总字段自洽
    let sum: f64 = byproducts.byproducts.iter().map(|b| b.quantity).sum();
    assert!((byproducts.total_waste - sum).abs() < 1e-9);
    assert!(byproducts.waste_pct > 0.0);
    assert!(
        byproducts.recommendations.iter().any(|r| r.contains("recovery")),
        "存在可回收流应有回收建议"
    );
}

// ==========================================
// 测试用例 3: 成本与净成本
// ==========================================

#[test]
fn test_cost_rollup_and_net_cost() {
    let result = engine().calculate(&full_request()).expect("应计算成功");
    let cost = &result.cost;

    // 工时: 0.5 + 1 + 1/3 小时 × 28
    let expected_labor = (0.5 + 1.0 + 20.0 / 60.0) * 28.0;
    assert!((cost.labor_cost - expected_labor).abs() < 1e-6);

    // 总成本精确等于六项之和
    let sum = cost.raw_materials_cost
        + cost.labor_cost
        + cost.overhead_cost
        + cost.packaging_cost
        + cost.energy_cost
        + cost.shipping_cost;
    assert_eq!(cost.total_cost, sum);

    // 净成本扣减副产物估值
    assert!(
        (cost.net_cost - (cost.total_cost - result.byproducts.total_value)).abs() < 1e-9,
        "net_cost = total_cost − 副产物估值"
    );

    // markup 40% ⇒ 毛利 40/140 ≈ 28.6% > 20%, 不应有毛利警告
    assert!((cost.gross_margin_pct - 40.0 / 1.4).abs() < 1e-6);
    assert!(cost.break_even_volume.is_some());
}

// ==========================================
// 测试用例 4: 兜底留痕与警告
// ==========================================

#[test]
fn test_assumptions_and_warnings() {
    let result = engine().calculate(&full_request()).expect("应计算成功");

    // filter-01 产能 800 < Filtration 投入 1000 ⇒ 产能警告
    assert!(
        result.warnings.iter().any(|w| w.contains("filter-01")),
        "设备产能不足应告警: {:?}",
        result.warnings
    );

    // BOM 在场, 不应有 MissingBom 假设
    assert!(!result.metadata.assumptions.contains(&Assumption::MissingBom));

    // 无跨族换算, 不应有密度假设
    assert!(result
        .metadata
        .assumptions
        .iter()
        .all(|a| !matches!(a, Assumption::DensityDefaulted { .. })));
}

#[test]
fn test_density_default_leaves_assumption_marker() {
    // 跨族换算但密度表为空: 按 1.0 kg/L 兜底并留痕
    let mut request = full_request();
    request.target_unit = "L".to_string();

    let result = engine().calculate(&request).expect("密度未命中不阻断计算");

    let oj = result
        .scaled_ingredients
        .iter()
        .find(|i| i.name == "orange juice")
        .unwrap();
    assert!(oj.density_assumed, "密度兜底必须标记在原料上");
    // 兜底密度 1.0: 700 kg → 700 L
    assert!((oj.scaled_quantity - 700.0).abs() < 1e-9);
    assert!(
        result.metadata.assumptions.iter().any(|a| matches!(
            a,
            Assumption::DensityDefaulted { ingredient } if ingredient == "orange juice"
        )),
        "元数据应记录密度兜底假设"
    );
}

#[test]
fn test_missing_bom_degrades_with_assumption() {
    let mut request = full_request();
    request.bom = None;

    let result = engine().calculate(&request).expect("缺 BOM 不阻断计算");

    assert_eq!(result.cost.labor_cost, 0.0, "无 BOM 人工成本为 0");
    assert!(result.metadata.assumptions.contains(&Assumption::MissingBom));
    // 收率链退化: 种子 + 未匹配损耗模型 + 对账
    assert!(result.yield_chain.len() >= 2);
}

#[test]
fn test_scale_factor_and_batch_bound_warnings() {
    // 批量 200 < min 500 且 scale 2 正常
    let mut request = full_request();
    request.target_batch_size = 200.0;
    let result = engine().calculate(&request).expect("应计算成功");
    assert!(
        result.warnings.iter().any(|w| w.contains("below plant minimum")),
        "低于最小批量应告警"
    );

    // scale factor > 100
    let mut request = full_request();
    request.target_batch_size = 20000.0;
    request.plant_constraints = None;
    let result = engine().calculate(&request).expect("应计算成功");
    assert!(
        result.warnings.iter().any(|w| w.contains("Scale factor")),
        "放大系数过大应告警"
    );
}

#[test]
fn test_unreconcilable_requested_yield_warns() {
    // 工序损耗已把累计压到 ~94% 以下, 请求 99% 无法向下对账
    let mut request = full_request();
    request.yield_percentage = 99.0;

    let result = engine().calculate(&request).expect("应计算成功");

    assert!(
        result
            .yield_chain
            .iter()
            .all(|s| s.step_name != TARGET_ADJUSTMENT_STEP_NAME),
        "请求收率高于可达值时不追加对账节点"
    );
    assert!(
        result.warnings.iter().any(|w| w.contains("exceeds achievable")),
        "应降级为警告: {:?}",
        result.warnings
    );
}

// ==========================================
// 测试用例 5: 营养基准不变性
// ==========================================

#[test]
fn test_nutrition_basis_invariance_across_batch_sizes() {
    let mut at_200 = full_request();
    at_200.target_batch_size = 200.0;
    at_200.plant_constraints = None;
    let mut at_2000 = full_request();
    at_2000.target_batch_size = 2000.0;
    at_2000.plant_constraints = None;

    let r200 = engine().calculate(&at_200).expect("应计算成功");
    let r2000 = engine().calculate(&at_2000).expect("应计算成功");

    // 每-100-单位口径应与批量无关 (取整误差容忍)
    assert!((r200.nutrition.calories - r2000.nutrition.calories).abs() < 0.5);
    assert!((r200.nutrition.sugar - r2000.nutrition.sugar).abs() < 0.5);
    assert!((r200.nutrition.vitamins["C"] - r2000.nutrition.vitamins["C"]).abs() < 0.5);
}

// ==========================================
// 测试用例 6: 效率分与元数据
// ==========================================

#[test]
fn test_efficiency_score_and_metadata() {
    let result = engine().calculate(&full_request()).expect("应计算成功");

    assert!(result.efficiency_score <= 100);
    assert!(result.efficiency_score > 0);
    assert!((result.metadata.scale_factor - 10.0).abs() < 1e-9);
    assert_eq!(result.metadata.engine_version, formulation_engine::VERSION);

    // 两次调用产生独立身份
    let second = engine().calculate(&full_request()).expect("应计算成功");
    assert_ne!(
        result.metadata.calculation_id, second.metadata.calculation_id,
        "结果无持久身份, 每次调用新 id"
    );
}

// ==========================================
// 测试用例 7: 请求级覆写优先于引擎默认
// ==========================================

#[test]
fn test_request_overrides_engine_defaults() {
    // 引擎默认成本参数 markup 10%, 请求覆写 40%
    let default_params = CostParameters {
        markup_pct: 10.0,
        ..Default::default()
    };
    let engine = CalculationEngine::new(EngineConfig::new().with_cost_parameters(default_params));

    let with_override = engine.calculate(&full_request()).expect("应计算成功");
    assert!((with_override.cost.gross_margin_pct - 40.0 / 1.4).abs() < 1e-6, "覆写生效");

    let mut without_override = full_request();
    without_override.cost_parameters = None;
    let with_default = engine.calculate(&without_override).expect("应计算成功");
    assert!((with_default.cost.gross_margin_pct - 10.0 / 1.1).abs() < 1e-6, "默认生效");
}
