// ==========================================
// 配方计算引擎 - 生产过程实体
// ==========================================
// 职责: BOM 工序清单与损耗模型
// ==========================================

use crate::domain::types::{DurationUnit, LossType};
use serde::{Deserialize, Serialize};

// ==========================================
// Bom - 生产工序清单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    #[serde(default)]
    pub name: String,
    /// 工序 (有序执行)
    pub steps: Vec<ProcessStep>,
}

// ==========================================
// ProcessStep - 生产工序
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub name: String,
    pub duration: f64,
    pub duration_unit: DurationUnit,
    /// 所用设备 (产能校验按此查 equipment_capacity)
    #[serde(default)]
    pub equipment: String,
    /// 工序级收率数据 (可选)
    #[serde(default)]
    pub yields: Option<StepYields>,
}

impl ProcessStep {
    /// 归一化工时 (小时)
    pub fn duration_hours(&self) -> f64 {
        self.duration_unit.to_hours(self.duration)
    }

    /// 由 yields.input/output 推导损耗率 (%)
    ///
    /// input 非正时无法推导, 返回 None
    pub fn derived_loss_pct(&self) -> Option<f64> {
        let y = self.yields.as_ref()?;
        if y.input <= 0.0 {
            return None;
        }
        Some((y.input - y.output) / y.input * 100.0)
    }
}

// ==========================================
// StepYields - 工序收率数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepYields {
    pub input: f64,
    pub output: f64,
    #[serde(default)]
    pub waste: f64,
    #[serde(default)]
    pub unit: String,
}

// ==========================================
// LossModel - 损耗模型
// ==========================================
// 匹配规则: step_name 与工序名大小写不敏感相等
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossModel {
    pub step_name: String,
    pub loss_type: LossType,
    /// 损耗率 (%)
    pub percentage: f64,
}

impl LossModel {
    /// 是否匹配指定工序名 (大小写不敏感)
    pub fn matches_step(&self, step_name: &str) -> bool {
        self.step_name.eq_ignore_ascii_case(step_name)
    }
}
