// ==========================================
// 需求预测系统 - 领域类型定义
// ==========================================
// 职责: 管道各阶段共享的枚举类型
// 红线: 所有跳过/分类结果必须输出 reason
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 期间粒度 (Period Granularity)
// ==========================================
// 预测输出的时间粒度,销售历史按此粒度归一化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodGranularity {
    Daily,   // 按日
    Monthly, // 按自然月 (归一化到当月1日)
}

impl PeriodGranularity {
    /// 将任意日期归一化到所属期间的起始日
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            PeriodGranularity::Daily => date,
            PeriodGranularity::Monthly => {
                // 当月1日,from_ymd_opt 对 day=1 恒有效
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
        }
    }

    /// 预测 horizon 个期间所需的按日预测点数
    ///
    /// Monthly 按 30 天/月换算,与上游预测库的日频输出约定一致
    pub fn horizon_in_days(&self, horizon_periods: usize) -> usize {
        match self {
            PeriodGranularity::Daily => horizon_periods,
            PeriodGranularity::Monthly => horizon_periods * 30,
        }
    }
}

impl fmt::Display for PeriodGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodGranularity::Daily => write!(f, "DAILY"),
            PeriodGranularity::Monthly => write!(f, "MONTHLY"),
        }
    }
}

// ==========================================
// 跳过原因 (Skip Reason)
// ==========================================
// 实体被排除出预测批次的原因,全部可审计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum SkipReason {
    // 历史期间数不足 (< min_distinct_periods)
    InsufficientHistory { distinct_periods: usize },
    // 常量/退化序列 (不同数量值 < min_distinct_quantities)
    ConstantSeries { distinct_quantities: usize },
    // 预测 Oracle 失败 (fit/predict 报错或 panic)
    OracleFailure { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientHistory { distinct_periods } => {
                write!(f, "insufficient history: {} distinct periods", distinct_periods)
            }
            SkipReason::ConstantSeries { distinct_quantities } => {
                write!(f, "constant series: {} distinct quantities", distinct_quantities)
            }
            SkipReason::OracleFailure { message } => {
                write!(f, "oracle failure: {}", message)
            }
        }
    }
}

// ==========================================
// 库存过剩状态 (Overstock Status)
// ==========================================
// 模型标志 × 外部标志 的四象限 + 外部已标记但不可预测
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverstockStatus {
    ConfirmedBoth,         // 模型与外部均标记
    NewFromModel,          // 仅模型标记 (新发现)
    PreviouslyFlaggedOnly, // 仅外部标记
    Clear,                 // 双方均未标记
    FlaggedUnforecastable, // 外部已标记但从未进入预测 (被跳过或无销售历史)
}

impl fmt::Display for OverstockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverstockStatus::ConfirmedBoth => write!(f, "CONFIRMED_BOTH"),
            OverstockStatus::NewFromModel => write!(f, "NEW_FROM_MODEL"),
            OverstockStatus::PreviouslyFlaggedOnly => write!(f, "PREVIOUSLY_FLAGGED_ONLY"),
            OverstockStatus::Clear => write!(f, "CLEAR"),
            OverstockStatus::FlaggedUnforecastable => write!(f, "FLAGGED_UNFORECASTABLE"),
        }
    }
}
