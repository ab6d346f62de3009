// ==========================================
// 需求预测系统 - 序列校验引擎
// ==========================================
// 职责: 判定实体历史是否可预测
// 红线: 跳过不是错误,必须输出 reason;零期间实体绝不进入预测
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::forecast::SkippedEntity;
use crate::domain::sales::TimeSeries;
use crate::domain::types::SkipReason;
use tracing::{debug, info};

// ==========================================
// ValidatedSeries - 校验结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidatedSeries {
    pub valid: Vec<TimeSeries>,
    pub skipped: Vec<SkippedEntity>,
}

// ==========================================
// SeriesValidator - 序列校验引擎
// ==========================================
// 近空或常量序列会使模型拟合失败或产出误导性预测,
// 在此处拦截以保护下游聚合与风险分析
pub struct SeriesValidator {
    min_distinct_periods: usize,
    min_distinct_quantities: usize,
}

impl SeriesValidator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            min_distinct_periods: config.min_distinct_periods,
            min_distinct_quantities: config.min_distinct_quantities,
        }
    }

    /// 将时间序列划分为 valid / skipped 两组
    ///
    /// # 规则
    /// - 不同期间数 < M → InsufficientHistory
    /// - 不同销量值数 < min_distinct_quantities → ConstantSeries
    pub fn validate(&self, series: Vec<TimeSeries>) -> ValidatedSeries {
        let mut result = ValidatedSeries::default();

        for s in series {
            let distinct_periods = s.distinct_periods();
            if distinct_periods < self.min_distinct_periods {
                debug!(entity = %s.key, distinct_periods, "跳过: 历史期间不足");
                result.skipped.push(SkippedEntity {
                    key: s.key,
                    reason: SkipReason::InsufficientHistory { distinct_periods },
                });
                continue;
            }

            let distinct_quantities = s.distinct_quantities();
            if distinct_quantities < self.min_distinct_quantities {
                debug!(entity = %s.key, distinct_quantities, "跳过: 退化序列");
                result.skipped.push(SkippedEntity {
                    key: s.key,
                    reason: SkipReason::ConstantSeries { distinct_quantities },
                });
                continue;
            }

            result.valid.push(s);
        }

        info!(
            valid = result.valid.len(),
            skipped = result.skipped.len(),
            "序列校验完成"
        );
        result
    }
}
