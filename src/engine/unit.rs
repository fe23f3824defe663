// ==========================================
// 配方计算引擎 - 单位换算
// ==========================================
// 职责: 质量族 {kg,g,lb,oz} / 体积族 {L,ml,gal,fl_oz}
//       族内定系数换算
// 红线: 非法单位名是唯一硬失败;
//       跨族换算必须经密度桥接 (density.rs)
// ==========================================

use crate::error::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// UnitFamily - 单位族
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Mass,
    Volume,
}

// ==========================================
// Unit - 计量单位
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    // 质量族
    Kg,
    G,
    Lb,
    Oz,
    // 体积族
    L,
    Ml,
    Gal,
    FlOz,
}

impl Unit {
    /// 解析单位名 (大小写不敏感)
    ///
    /// 非法单位名返回 CalcError::UnknownUnit — 整次计算中止
    pub fn parse(name: &str) -> CalcResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "lb" => Ok(Unit::Lb),
            "oz" => Ok(Unit::Oz),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            "gal" => Ok(Unit::Gal),
            "fl_oz" | "floz" | "fl oz" => Ok(Unit::FlOz),
            _ => Err(CalcError::UnknownUnit {
                unit: name.to_string(),
            }),
        }
    }

    /// 单位族
    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Kg | Unit::G | Unit::Lb | Unit::Oz => UnitFamily::Mass,
            Unit::L | Unit::Ml | Unit::Gal | Unit::FlOz => UnitFamily::Volume,
        }
    }

    /// 换算系数: 本单位 → 族基准单位 (kg / L)
    pub fn to_base_factor(&self) -> f64 {
        match self {
            Unit::Kg => 1.0,
            Unit::G => 0.001,
            Unit::Lb => 0.453592,
            Unit::Oz => 0.0283495,
            Unit::L => 1.0,
            Unit::Ml => 0.001,
            Unit::Gal => 3.78541,
            Unit::FlOz => 0.0295735,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::G => write!(f, "g"),
            Unit::Lb => write!(f, "lb"),
            Unit::Oz => write!(f, "oz"),
            Unit::L => write!(f, "L"),
            Unit::Ml => write!(f, "ml"),
            Unit::Gal => write!(f, "gal"),
            Unit::FlOz => write!(f, "fl_oz"),
        }
    }
}

// ==========================================
// 族内换算
// ==========================================

/// 族内单位换算
///
/// 同单位恒等; 跨族返回 CrossFamilyConversion
/// (调用方须改走密度桥接)
pub fn convert(value: f64, from: Unit, to: Unit) -> CalcResult<f64> {
    if from == to {
        return Ok(value);
    }
    if from.family() != to.family() {
        return Err(CalcError::CrossFamilyConversion {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(value * from.to_base_factor() / to.to_base_factor())
}

/// 按单位名换算 (解析失败即硬失败)
pub fn convert_named(value: f64, from: &str, to: &str) -> CalcResult<f64> {
    let from = Unit::parse(from)?;
    let to = Unit::parse(to)?;
    convert(value, from, to)
}
