// ==========================================
// 配方计算引擎 - 引擎层
// ==========================================
// 职责: 实现计算规则, 纯同步无副作用
// 红线: 引擎不做 I/O, 不持久化, 不发网络请求;
//       所有兜底必须输出 assumption/warning
// ==========================================

pub mod byproduct;
pub mod cost;
pub mod density;
pub mod nutrition;
pub mod orchestrator;
pub mod rounding;
pub mod unit;
pub mod yield_chain;

// 重导出核心引擎
pub use byproduct::ByproductAnalyzer;
pub use cost::CostCalculator;
pub use density::{DensityResolver, DEFAULT_DENSITY_KG_PER_L};
pub use nutrition::NutritionAggregator;
pub use orchestrator::CalculationEngine;
pub use rounding::RoundingEngine;
pub use unit::{convert, convert_named, Unit, UnitFamily};
pub use yield_chain::{YieldChainCalculator, INITIAL_STEP_NAME, TARGET_ADJUSTMENT_STEP_NAME};
