// ==========================================
// 食品饮料配方管理系统 - 配方计算引擎
// ==========================================
// 技术栈: Rust + serde + tracing
// 系统定位: 纯同步计算核心 (无 I/O / 无持久化),
//           由上层编排序列器作为管线一环调用
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 计算规则
pub mod engine;

// 配置层 - 引擎默认配置 (不可变)
pub mod config;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Assumption, ByproductCategory, DensityUnit, DurationUnit, LossType};

// 领域实体
pub use domain::{
    Bom, Byproduct, ByproductAnalysis, CalculationMetadata, CalculationRequest,
    CalculationResult, CostParameters, CostRollup, DensityEntry, DensityMap, Formulation,
    Ingredient, LossModel, NutrientProfile, PlantConstraints, ProcessStep, RoundingRule,
    ScaledIngredient, StepYields, YieldChainStep,
};

// 引擎
pub use engine::{
    convert, convert_named, ByproductAnalyzer, CalculationEngine, CostCalculator, DensityResolver,
    NutritionAggregator, RoundingEngine, Unit, UnitFamily, YieldChainCalculator,
    INITIAL_STEP_NAME, TARGET_ADJUSTMENT_STEP_NAME,
};

// 配置与错误
pub use config::EngineConfig;
pub use error::{CalcError, CalcResult};

/// 引擎版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
