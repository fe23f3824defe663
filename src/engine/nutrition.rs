// ==========================================
// 配方计算引擎 - 营养聚合
// ==========================================
// 职责: 按取整后数量累加营养成分,
//       归一化为 "每 100 单位产出" 口径
// 不变式: 结果与批量无关 (基准不变性)
// ==========================================

use crate::domain::formulation::Ingredient;
use crate::domain::result::{AggregatedNutrition, ScaledIngredient};
use tracing::instrument;

// ==========================================
// NutritionAggregator - 营养聚合器
// ==========================================
pub struct NutritionAggregator;

impl NutritionAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 聚合营养成分
    ///
    /// 每个携带营养表的原料按 rounded_quantity/100 缩放累加
    /// (营养表为每 100 单位原料口径); 累加完成后若取整总量
    /// 超过 100 单位, 所有字段 ×100/总量 归一化,
    /// 使结果始终为 "每 100 单位产出" 口径
    #[instrument(skip_all, fields(count = scaled.len()))]
    pub fn aggregate(
        &self,
        ingredients: &[Ingredient],
        scaled: &[ScaledIngredient],
    ) -> AggregatedNutrition {
        let mut total = AggregatedNutrition::default();
        let mut total_mass = 0.0;

        for (ingredient, scaled_ing) in ingredients.iter().zip(scaled.iter()) {
            total_mass += scaled_ing.rounded_quantity;

            let Some(profile) = &ingredient.nutrition else {
                continue;
            };
            let factor = scaled_ing.rounded_quantity / 100.0;

            total.calories += profile.calories * factor;
            total.protein += profile.protein * factor;
            total.carbohydrates += profile.carbohydrates * factor;
            total.fat += profile.fat * factor;
            total.fiber += profile.fiber * factor;
            total.sugar += profile.sugar * factor;
            total.sodium += profile.sodium * factor;

            for (key, value) in &profile.vitamins {
                *total.vitamins.entry(key.clone()).or_insert(0.0) += value * factor;
            }
            for (key, value) in &profile.minerals {
                *total.minerals.entry(key.clone()).or_insert(0.0) += value * factor;
            }
        }

        // 归一化为每 100 单位产出
        if total_mass > 100.0 {
            let norm = 100.0 / total_mass;
            total.calories *= norm;
            total.protein *= norm;
            total.carbohydrates *= norm;
            total.fat *= norm;
            total.fiber *= norm;
            total.sugar *= norm;
            total.sodium *= norm;
            for value in total.vitamins.values_mut() {
                *value *= norm;
            }
            for value in total.minerals.values_mut() {
                *value *= norm;
            }
        }

        total
    }
}

impl Default for NutritionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formulation::NutrientProfile;
    use std::collections::HashMap;

    fn ingredient(name: &str, profile: Option<NutrientProfile>) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity: 0.0,
            unit: "kg".to_string(),
            percentage: 0.0,
            function: String::new(),
            unit_cost: 0.0,
            nutrition: profile,
            alternatives: vec![],
        }
    }

    fn scaled(name: &str, rounded: f64) -> ScaledIngredient {
        ScaledIngredient {
            name: name.to_string(),
            original_quantity: 0.0,
            original_unit: "kg".to_string(),
            percentage: 0.0,
            scaled_quantity: rounded,
            rounded_quantity: rounded,
            unit: "kg".to_string(),
            cost: 0.0,
            density_assumed: false,
        }
    }

    fn juice_profile() -> NutrientProfile {
        let mut vitamins = HashMap::new();
        vitamins.insert("C".to_string(), 50.0);
        NutrientProfile {
            calories: 45.0,
            protein: 0.7,
            carbohydrates: 10.4,
            fat: 0.2,
            fiber: 0.2,
            sugar: 8.4,
            sodium: 1.0,
            vitamins,
            minerals: HashMap::new(),
        }
    }

    #[test]
    fn test_aggregation_per_100_normalized() {
        let agg = NutritionAggregator::new();
        // 200 单位果汁: 累加 45×2 = 90, 归一化 ×100/200 → 45
        let ingredients = vec![ingredient("juice", Some(juice_profile()))];
        let scaled = vec![scaled("juice", 200.0)];
        let result = agg.aggregate(&ingredients, &scaled);
        assert!((result.calories - 45.0).abs() < 1e-9);
        assert!((result.vitamins["C"] - 50.0).abs() < 1e-9, "维生素键独立累加并归一化");
    }

    #[test]
    fn test_basis_invariance() {
        // 测试性质: 200 单位与 2000 单位的每-100-单位营养应一致
        let agg = NutritionAggregator::new();
        let ingredients = vec![
            ingredient("juice", Some(juice_profile())),
            ingredient("water", None),
        ];
        let at_200 = agg.aggregate(&ingredients, &[scaled("juice", 160.0), scaled("water", 40.0)]);
        let at_2000 = agg.aggregate(&ingredients, &[scaled("juice", 1600.0), scaled("water", 400.0)]);
        assert!((at_200.calories - at_2000.calories).abs() < 1e-6, "基准不变性");
        assert!((at_200.sugar - at_2000.sugar).abs() < 1e-6);
        assert!((at_200.vitamins["C"] - at_2000.vitamins["C"]).abs() < 1e-6);
    }

    #[test]
    fn test_small_batch_not_renormalized() {
        // 总量 ≤100 时不归一化 (既定口径)
        let agg = NutritionAggregator::new();
        let ingredients = vec![ingredient("juice", Some(juice_profile()))];
        let result = agg.aggregate(&ingredients, &[scaled("juice", 50.0)]);
        assert!((result.calories - 22.5).abs() < 1e-9, "50 单位 ⇒ 45×0.5, 不再归一化");
    }

    #[test]
    fn test_ingredients_without_profile_count_toward_mass() {
        // 无营养表的原料不贡献营养但计入归一化分母
        let agg = NutritionAggregator::new();
        let ingredients = vec![
            ingredient("juice", Some(juice_profile())),
            ingredient("water", None),
        ];
        let result = agg.aggregate(&ingredients, &[scaled("juice", 100.0), scaled("water", 100.0)]);
        // 累加 45, 归一化 ×100/200 → 22.5
        assert!((result.calories - 22.5).abs() < 1e-9);
    }
}
