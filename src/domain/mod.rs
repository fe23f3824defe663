// ==========================================
// 配方计算引擎 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含业务规则
// ==========================================

pub mod formulation;
pub mod plant;
pub mod process;
pub mod result;
pub mod types;

// 重导出核心实体
pub use formulation::{Formulation, Ingredient, NutrientProfile};
pub use plant::{CostParameters, DensityEntry, DensityMap, PlantConstraints, RoundingRule};
pub use process::{Bom, LossModel, ProcessStep, StepYields};
pub use result::{
    AggregatedNutrition, Byproduct, ByproductAnalysis, CalculationMetadata, CalculationRequest,
    CalculationResult, CostRollup, ScaledIngredient, YieldChainStep,
};
pub use types::{Assumption, ByproductCategory, DensityUnit, DurationUnit, LossType};
