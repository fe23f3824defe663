// ==========================================
// 配方计算引擎 - 收率链计算
// ==========================================
// 职责: 逐工序质量追踪与累计收率
// 输入: 初始投入量 + BOM + 损耗模型 + 请求收率
// 输出: YieldChainStep 线性链 (非分支状态机)
// 红线: 累计收率单调不增, 限定在 [0,100];
//       Target Yield Adjustment 为对账条目, 非物理工序
// ==========================================

use crate::domain::process::{Bom, LossModel};
use crate::domain::result::YieldChainStep;
use tracing::{debug, instrument};

/// 初始节点名称
pub const INITIAL_STEP_NAME: &str = "Initial Input";
/// 目标收率对账节点名称
pub const TARGET_ADJUSTMENT_STEP_NAME: &str = "Target Yield Adjustment";

// ==========================================
// YieldChainCalculator - 收率链计算器
// ==========================================
pub struct YieldChainCalculator;

impl YieldChainCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 计算完整收率链
    ///
    /// # 参数
    /// - initial_quantity: 初始投入量 (编排器传入放大后合计)
    /// - bom: 工序清单 (可选)
    /// - loss_models: 损耗模型 (有序)
    /// - requested_yield_pct: 请求收率 (%)
    ///
    /// # 流程
    /// 1. "Initial Input" 种子节点 (收率 100%)
    /// 2. 逐 BOM 工序: 损耗率取命中的 LossModel.percentage,
    ///    否则由工序 yields.input/output 推导, 否则 0
    /// 3. 未命中任何工序的 LossModel 按声明顺序补算
    /// 4. 请求收率 <100 且低于已达累计收率时,
    ///    追加合成对账节点强制落在请求值上
    #[instrument(skip(self, bom, loss_models), fields(
        initial_quantity = initial_quantity,
        requested_yield_pct = requested_yield_pct,
    ))]
    pub fn trace(
        &self,
        initial_quantity: f64,
        bom: Option<&Bom>,
        loss_models: &[LossModel],
        requested_yield_pct: f64,
    ) -> Vec<YieldChainStep> {
        let mut chain = Vec::new();

        // ==========================================
        // 步骤1: 种子节点
        // ==========================================
        chain.push(YieldChainStep {
            step_name: INITIAL_STEP_NAME.to_string(),
            input_quantity: 0.0,
            output_quantity: initial_quantity,
            loss_quantity: 0.0,
            loss_pct: 0.0,
            step_yield_pct: 100.0,
            cumulative_yield_pct: 100.0,
            loss_type: None,
            synthetic: false,
        });

        let mut current_qty = initial_quantity;
        let mut cumulative = 100.0;
        let mut matched_models = vec![false; loss_models.len()];

        // ==========================================
        // 步骤2: 逐 BOM 工序追踪
        // ==========================================
        if let Some(bom) = bom {
            for step in &bom.steps {
                // 损耗率优先级: 命中损耗模型 > 工序 yields 推导 > 0
                let matched = loss_models
                    .iter()
                    .position(|m| m.matches_step(&step.name));

                let (loss_pct, loss_type) = match matched {
                    Some(idx) => {
                        matched_models[idx] = true;
                        (loss_models[idx].percentage, Some(loss_models[idx].loss_type))
                    }
                    None => (step.derived_loss_pct().unwrap_or(0.0), None),
                };

                let node = Self::advance(
                    &step.name,
                    current_qty,
                    loss_pct,
                    loss_type,
                    &mut cumulative,
                );
                current_qty = node.output_quantity;
                debug!(step = %step.name, loss_pct, cumulative, "yield chain step");
                chain.push(node);
            }
        }

        // ==========================================
        // 步骤3: 未匹配损耗模型按声明顺序补算
        // ==========================================
        for (idx, model) in loss_models.iter().enumerate() {
            if matched_models[idx] {
                continue;
            }
            let node = Self::advance(
                &model.step_name,
                current_qty,
                model.percentage,
                Some(model.loss_type),
                &mut cumulative,
            );
            current_qty = node.output_quantity;
            chain.push(node);
        }

        // ==========================================
        // 步骤4: 目标收率对账
        // ==========================================
        // 请求收率高于已达累计收率时无法单调向下对账,
        // 由编排器降级为 warning; 此处只做向下强制收口
        if requested_yield_pct < 100.0
            && requested_yield_pct >= 0.0
            && requested_yield_pct < cumulative
        {
            let target_output = initial_quantity * requested_yield_pct / 100.0;
            let loss_qty = current_qty - target_output;
            let step_yield = if current_qty > 0.0 {
                target_output / current_qty * 100.0
            } else {
                0.0
            };
            chain.push(YieldChainStep {
                step_name: TARGET_ADJUSTMENT_STEP_NAME.to_string(),
                input_quantity: current_qty,
                output_quantity: target_output,
                loss_quantity: loss_qty,
                loss_pct: 100.0 - step_yield,
                step_yield_pct: step_yield,
                cumulative_yield_pct: requested_yield_pct.clamp(0.0, 100.0),
                loss_type: None,
                synthetic: true,
            });
        }

        chain
    }

    /// 推进一个工序节点并更新累计收率
    fn advance(
        step_name: &str,
        current_qty: f64,
        loss_pct: f64,
        loss_type: Option<crate::domain::types::LossType>,
        cumulative: &mut f64,
    ) -> YieldChainStep {
        let loss_qty = current_qty * loss_pct / 100.0;
        let output_qty = current_qty - loss_qty;
        // 除零防护: 空链输入收率按 0 计
        let step_yield = if current_qty > 0.0 {
            output_qty / current_qty * 100.0
        } else {
            0.0
        };
        *cumulative = (*cumulative * step_yield / 100.0).clamp(0.0, 100.0);

        YieldChainStep {
            step_name: step_name.to_string(),
            input_quantity: current_qty,
            output_quantity: output_qty,
            loss_quantity: loss_qty,
            loss_pct,
            step_yield_pct: step_yield,
            cumulative_yield_pct: *cumulative,
            loss_type,
            synthetic: false,
        }
    }
}

impl Default for YieldChainCalculator {
    fn default() -> Self {
        Self::new()
    }
}
