// ==========================================
// 配方计算引擎 - 错误类型
// ==========================================
// 职责: 定义引擎硬失败错误
// 红线: 仅单位名非法会中止计算 (§错误处理契约);
//       其余异常一律降级为 warning/assumption
// ==========================================

use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// 非法单位名: 唯一会中止整次计算的错误
    #[error("unknown unit: {unit}")]
    UnknownUnit { unit: String },

    /// 跨族直接换算 (质量↔体积必须经密度桥接)
    #[error("cross-family conversion requires density bridge: {from} -> {to}")]
    CrossFamilyConversion { from: String, to: String },
}

pub type CalcResult<T> = Result<T, CalcError>;
