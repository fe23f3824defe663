// ==========================================
// 配方计算引擎 - 工厂约束取整
// ==========================================
// 职责: 连续放大数量 → 生产可执行数量
// 红线: 规则按声明顺序首次命中生效 (列表序即优先级,
//       不引入隐式优先级); 命中规则的结果不低于
//       round_to_nearest (不取整到零)
// ==========================================

use crate::domain::plant::RoundingRule;
use tracing::trace;

// ==========================================
// RoundingEngine - 取整引擎
// ==========================================
pub struct RoundingEngine;

impl RoundingEngine {
    pub fn new() -> Self {
        Self
    }

    /// 按规则列表取整
    ///
    /// 规则扫描 (声明顺序): 名称模式 (大小写不敏感子串,
    /// None 不限) 匹配且 min_quantity ≤ 数量的第一条生效;
    /// 无命中回落到量级分段:
    /// <1 → 2位小数, <10 → 1位小数, ≥10 → 取整数
    pub fn round(&self, ingredient_name: &str, quantity: f64, rules: &[RoundingRule]) -> f64 {
        for rule in rules {
            if !Self::rule_applies(rule, ingredient_name, quantity) {
                continue;
            }
            let rounded = Self::apply_rule(rule, quantity);
            trace!(
                ingredient = %ingredient_name,
                quantity,
                rounded,
                round_to_nearest = rule.round_to_nearest,
                "rounding rule hit"
            );
            return rounded;
        }
        Self::magnitude_band_round(quantity)
    }

    fn rule_applies(rule: &RoundingRule, ingredient_name: &str, quantity: f64) -> bool {
        if quantity < rule.min_quantity {
            return false;
        }
        match &rule.ingredient_pattern {
            Some(pattern) => ingredient_name
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
            None => true,
        }
    }

    /// 取整到最近的 round_to_nearest 倍数, 不低于 round_to_nearest
    fn apply_rule(rule: &RoundingRule, quantity: f64) -> f64 {
        if rule.round_to_nearest <= 0.0 {
            return Self::magnitude_band_round(quantity);
        }
        let rounded = (quantity / rule.round_to_nearest).round() * rule.round_to_nearest;
        rounded.max(rule.round_to_nearest)
    }

    /// 量级分段兜底
    fn magnitude_band_round(quantity: f64) -> f64 {
        if quantity < 1.0 {
            (quantity * 100.0).round() / 100.0
        } else if quantity < 10.0 {
            (quantity * 10.0).round() / 10.0
        } else {
            quantity.round()
        }
    }
}

impl Default for RoundingEngine {
    fn default() -> Self {
        Self::new()
    }
}
