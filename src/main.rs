// ==========================================
// 配方计算引擎 - CLI 入口
// ==========================================
// 用途: 读取 CalculationRequest JSON 文件,
//       执行计算并输出 CalculationResult JSON
// ==========================================

use anyhow::{bail, Context, Result};
use formulation_engine::{logging, CalculationEngine, CalculationRequest, EngineConfig};
use std::fs;

fn main() -> Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("配方计算引擎 - F&B Formulation Calculation Engine");
    tracing::info!("引擎版本: {}", formulation_engine::VERSION);
    tracing::info!("==================================================");

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: formulation-engine <request.json>");
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("无法读取请求文件: {}", path))?;
    let request: CalculationRequest =
        serde_json::from_str(&raw).context("请求 JSON 解析失败")?;

    let engine = CalculationEngine::new(EngineConfig::new());
    let result = engine
        .calculate(&request)
        .context("计算失败 (非法单位名)")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
