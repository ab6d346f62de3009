// ==========================================
// 需求预测系统 - 预测 Oracle 能力接口
// ==========================================
// 职责: 将具体预测算法与管道解耦
// 约定: fit 产出模型,predict 从序列末期之后产出日频预测
// 红线: 管道正确性不依赖任何具体算法
// ==========================================

pub mod linear_trend;

pub use linear_trend::LinearTrendOracle;

use crate::domain::sales::TimeSeries;
use chrono::NaiveDate;
use thiserror::Error;

// ==========================================
// Oracle 错误
// ==========================================
#[derive(Error, Debug)]
pub enum OracleError {
    // 序列退化等拟合失败 (校验器已过滤,但 Oracle 可按自身标准再拒绝)
    #[error("模型拟合失败: {0}")]
    Fit(String),

    #[error("模型预测失败: {0}")]
    Predict(String),
}

// ==========================================
// Trait: ForecastOracle
// ==========================================
/// 预测能力接口
///
/// 实现必须 Sync: 一个 Oracle 实例会被并行工作线程只读共享。
/// 带内部可变状态的实现需自行同步,或在 fit 中为每次调用
/// 构造独立模型。
pub trait ForecastOracle: Sync {
    /// 在时间序列上拟合模型
    fn fit(&self, series: &TimeSeries) -> Result<Box<dyn FittedModel>, OracleError>;
}

// ==========================================
// Trait: FittedModel
// ==========================================
/// 已拟合模型
///
/// predict 必须返回自拟合序列末期间之后、至少 horizon_days 个
/// 严格递增的日频 (period, quantity) 预测点。
pub trait FittedModel: Send {
    fn predict(&self, horizon_days: usize) -> Result<Vec<(NaiveDate, f64)>, OracleError>;
}
