// ==========================================
// 配方计算引擎 - 密度解析与质量/体积桥接
// ==========================================
// 职责: 原料名 → 密度查询 (大小写不敏感),
//       质量族 ↔ 体积族 经密度桥接换算
// 红线: 密度未命中不报错, 按 1.0 kg/L 兜底,
//       但必须在结果上显式留痕 (density_assumed)
// ==========================================

use crate::domain::plant::DensityMap;
use crate::engine::unit::{convert, Unit, UnitFamily};
use crate::error::CalcResult;
use tracing::debug;

/// 密度兜底值 (kg/L): 密度表未命中时使用
pub const DEFAULT_DENSITY_KG_PER_L: f64 = 1.0;

// ==========================================
// DensityResolver - 密度解析器
// ==========================================
pub struct DensityResolver<'a> {
    density_map: &'a DensityMap,
}

impl<'a> DensityResolver<'a> {
    pub fn new(density_map: &'a DensityMap) -> Self {
        Self { density_map }
    }

    /// 按原料名解析密度 (kg/L)
    ///
    /// # 返回
    /// (密度值 kg/L, 是否为兜底假设)
    pub fn resolve(&self, ingredient_name: &str) -> (f64, bool) {
        let hit = self
            .density_map
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(ingredient_name));

        match hit {
            Some((_, entry)) => (entry.density_kg_per_l(), false),
            None => {
                debug!(
                    ingredient = %ingredient_name,
                    default_density = DEFAULT_DENSITY_KG_PER_L,
                    "density miss, falling back to default"
                );
                (DEFAULT_DENSITY_KG_PER_L, true)
            }
        }
    }

    /// 跨族桥接换算
    ///
    /// 同族时退化为普通族内换算 (不查密度表);
    /// 跨族时经 kg/L 密度桥接:
    /// volume(L) = mass(kg)/density, mass(kg) = volume(L)×density
    ///
    /// # 返回
    /// (换算后数量, 是否使用了密度兜底)
    pub fn bridge(
        &self,
        value: f64,
        from: Unit,
        to: Unit,
        ingredient_name: &str,
    ) -> CalcResult<(f64, bool)> {
        if from.family() == to.family() {
            return Ok((convert(value, from, to)?, false));
        }

        let (density, assumed) = self.resolve(ingredient_name);

        let result = match from.family() {
            // 质量 → 体积: 归一到 kg, 除以密度得 L, 再换算到目标体积单位
            UnitFamily::Mass => {
                let kg = convert(value, from, Unit::Kg)?;
                let liters = kg / density;
                convert(liters, Unit::L, to)?
            }
            // 体积 → 质量: 归一到 L, 乘以密度得 kg, 再换算到目标质量单位
            UnitFamily::Volume => {
                let liters = convert(value, from, Unit::L)?;
                let kg = liters * density;
                convert(kg, Unit::Kg, to)?
            }
        };

        Ok((result, assumed))
    }
}
