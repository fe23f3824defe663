// ==========================================
// 配方计算引擎 - 引擎配置
// ==========================================
// 职责: 引擎级默认配置 (密度表 / 工厂约束 / 成本参数)
// 红线: 配置不可变, 无 setter; 请求级覆写优先于引擎默认,
//       单次 calculate 运行期间配置不会变化,
//       独立调用可跨线程并发执行
// ==========================================

use crate::domain::plant::{CostParameters, DensityMap, PlantConstraints};

// ==========================================
// EngineConfig - 引擎默认配置
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// 默认密度表 (请求未覆写时生效)
    pub density_map: DensityMap,
    /// 默认工厂约束
    pub plant_constraints: PlantConstraints,
    /// 默认成本参数
    pub cost_parameters: CostParameters,
}

impl EngineConfig {
    /// 空配置: 无密度表 / 无取整规则 / 成本参数全零
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_density_map(mut self, density_map: DensityMap) -> Self {
        self.density_map = density_map;
        self
    }

    pub fn with_plant_constraints(mut self, plant_constraints: PlantConstraints) -> Self {
        self.plant_constraints = plant_constraints;
        self
    }

    pub fn with_cost_parameters(mut self, cost_parameters: CostParameters) -> Self {
        self.cost_parameters = cost_parameters;
        self
    }
}
