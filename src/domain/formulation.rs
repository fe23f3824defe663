// ==========================================
// 配方计算引擎 - 配方实体
// ==========================================
// 职责: 100 单位基准配方及其原料清单
// 红线: 引擎不修改调用方传入的配方数据
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Formulation - 配方 (100 单位基准)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    pub name: String,
    /// 基准产量 (配方按此基准表达, 惯例为 100)
    pub target_yield: f64,
    /// 基准产量单位 (如 "kg")
    pub yield_unit: String,
    /// 原料清单 (有序)
    pub ingredients: Vec<Ingredient>,
}

impl Formulation {
    /// 原料数量合计 (配方基准口径)
    pub fn total_ingredient_quantity(&self) -> f64 {
        self.ingredients.iter().map(|i| i.quantity).sum()
    }
}

// ==========================================
// Ingredient - 原料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// 基准数量 (配方 100 单位口径)
    pub quantity: f64,
    pub unit: String,
    /// 占基准比例 (%)
    pub percentage: f64,
    /// 功能标签 (base/sweetener/acid/other/...)
    #[serde(default)]
    pub function: String,
    /// 单位成本
    #[serde(default)]
    pub unit_cost: f64,
    /// 营养成分表 (每 100 单位原料)
    #[serde(default)]
    pub nutrition: Option<NutrientProfile>,
    /// 可替代原料清单
    #[serde(default)]
    pub alternatives: Vec<String>,
}

// ==========================================
// NutrientProfile - 营养成分表
// ==========================================
// 所有字段均为 "每 100 单位" 口径
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientProfile {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
    /// 维生素 (开放键集, 独立累加)
    #[serde(default)]
    pub vitamins: HashMap<String, f64>,
    /// 矿物质 (开放键集, 独立累加)
    #[serde(default)]
    pub minerals: HashMap<String, f64>,
}
