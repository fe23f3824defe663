// ==========================================
// 配方计算引擎 - 领域类型定义
// ==========================================
// 职责: 计算引擎使用的枚举类型全集
// 序列化格式: 与外部数据源一致 (lowercase)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 损耗类型 (Loss Type)
// ==========================================
// 来源: LossModel.loss_type, 决定副产物分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossType {
    Process,     // 工艺损耗
    Evaporation, // 蒸发损耗
    Moisture,    // 水分损耗
    Waste,       // 废弃损耗
    Transfer,    // 转运损耗
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossType::Process => write!(f, "process"),
            LossType::Evaporation => write!(f, "evaporation"),
            LossType::Moisture => write!(f, "moisture"),
            LossType::Waste => write!(f, "waste"),
            LossType::Transfer => write!(f, "transfer"),
        }
    }
}

// ==========================================
// 副产物分类 (Byproduct Category)
// ==========================================
// 顺序无语义, 仅作流向标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByproductCategory {
    Waste,      // 废弃流
    Recyclable, // 可回收流
    Saleable,   // 可销售流
    Hazardous,  // 危险品流
}

impl fmt::Display for ByproductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByproductCategory::Waste => write!(f, "waste"),
            ByproductCategory::Recyclable => write!(f, "recyclable"),
            ByproductCategory::Saleable => write!(f, "saleable"),
            ByproductCategory::Hazardous => write!(f, "hazardous"),
        }
    }
}

// ==========================================
// 工时单位 (Duration Unit)
// ==========================================
// 工时归一化: minutes/60, hours×1, days×8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    /// 换算为工时 (days 按 8 小时工作日计)
    pub fn to_hours(&self, duration: f64) -> f64 {
        match self {
            DurationUnit::Minutes => duration / 60.0,
            DurationUnit::Hours => duration,
            DurationUnit::Days => duration * 8.0,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Minutes => write!(f, "minutes"),
            DurationUnit::Hours => write!(f, "hours"),
            DurationUnit::Days => write!(f, "days"),
        }
    }
}

// ==========================================
// 密度单位 (Density Unit)
// ==========================================
// 内部统一换算为 kg/L: g/mL 数值等价, lb/gal ×0.119826
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityUnit {
    #[serde(rename = "kg/L")]
    KgPerL,
    #[serde(rename = "g/mL")]
    GPerMl,
    #[serde(rename = "lb/gal")]
    LbPerGal,
}

impl DensityUnit {
    /// 换算系数: 本单位数值 → kg/L 数值
    pub fn to_kg_per_l_factor(&self) -> f64 {
        match self {
            DensityUnit::KgPerL => 1.0,
            DensityUnit::GPerMl => 1.0,
            DensityUnit::LbPerGal => 0.119826,
        }
    }
}

impl fmt::Display for DensityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityUnit::KgPerL => write!(f, "kg/L"),
            DensityUnit::GPerMl => write!(f, "g/mL"),
            DensityUnit::LbPerGal => write!(f, "lb/gal"),
        }
    }
}

// ==========================================
// 计算假设 (Assumption)
// ==========================================
// 红线: 静默兜底必须显式留痕, 下游据此区分
// "可信结果" 与 "兜底结果"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assumption {
    /// 密度表未命中, 按 1.0 kg/L 兜底
    DensityDefaulted { ingredient: String },
    /// 请求未提供 BOM, 人工成本按 0 计, 收率链退化为最小链
    MissingBom,
    /// 配方 target_yield 非正, 按 100 单位基准兜底
    BasisDefaulted,
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assumption::DensityDefaulted { ingredient } => {
                write!(f, "ASSUMPTION_DENSITY_DEFAULT: ingredient={}, density=1.0 kg/L", ingredient)
            }
            Assumption::MissingBom => {
                write!(f, "ASSUMPTION_MISSING_BOM: labor_cost=0, minimal yield chain")
            }
            Assumption::BasisDefaulted => {
                write!(f, "ASSUMPTION_BASIS_DEFAULT: formulation target_yield invalid, basis=100")
            }
        }
    }
}
