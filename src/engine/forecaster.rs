// ==========================================
// 需求预测系统 - 预测编排引擎
// ==========================================
// 职责: 对每个有效实体调用 Oracle,隔离单实体失败,
//       将日频预测重采样为目标期间粒度并截取 horizon
// 红线: 单实体失败 (报错或 panic) 绝不中断批次其余实体
// 执行: 顺序 或 rayon 有界线程池扇出/扇入
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::forecast::{ForecastBatch, ForecastPoint, SkippedEntity};
use crate::domain::sales::TimeSeries;
use crate::domain::types::{PeriodGranularity, SkipReason};
use crate::oracle::ForecastOracle;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

// ==========================================
// ForecastEngine - 预测编排引擎
// ==========================================
pub struct ForecastEngine {
    horizon_periods: usize,
    granularity: PeriodGranularity,
    parallel_workers: usize,
}

impl ForecastEngine {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            horizon_periods: config.horizon_periods,
            granularity: config.granularity,
            parallel_workers: config.parallel_workers,
        }
    }

    /// 对全部有效序列执行预测
    ///
    /// # 返回
    /// ForecastBatch: 成功实体的预测点 + 失败实体的跳过记录。
    /// 不保证跨实体顺序;单实体内期间严格递增。
    pub fn forecast_all(
        &self,
        valid: &[TimeSeries],
        oracle: &dyn ForecastOracle,
    ) -> ForecastBatch {
        let outcomes: Vec<Result<Vec<ForecastPoint>, SkippedEntity>> =
            if self.parallel_workers > 1 {
                self.run_parallel(valid, oracle)
            } else {
                valid
                    .iter()
                    .map(|series| self.forecast_one(series, oracle))
                    .collect()
            };

        let mut batch = ForecastBatch::default();
        for outcome in outcomes {
            match outcome {
                Ok(points) => batch.points.extend(points),
                Err(skipped) => {
                    warn!(entity = %skipped.key, reason = %skipped.reason, "实体预测失败,跳过");
                    batch.skipped.push(skipped);
                }
            }
        }

        info!(
            entities = batch.entity_count(),
            points = batch.points.len(),
            skipped = batch.skipped.len(),
            "预测批次完成"
        );
        batch
    }

    /// rayon 有界线程池扇出 (每实体独立,只读共享 Oracle)
    fn run_parallel(
        &self,
        valid: &[TimeSeries],
        oracle: &dyn ForecastOracle,
    ) -> Vec<Result<Vec<ForecastPoint>, SkippedEntity>> {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallel_workers)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                // 线程池构建失败时退回顺序执行,失败隔离语义不变
                warn!(error = %e, "线程池构建失败,退回顺序执行");
                return valid
                    .iter()
                    .map(|series| self.forecast_one(series, oracle))
                    .collect();
            }
        };

        pool.install(|| {
            valid
                .par_iter()
                .map(|series| self.forecast_one(series, oracle))
                .collect()
        })
    }

    /// 单实体预测: fit → predict → 重采样 → 截取 horizon
    ///
    /// Oracle 报错与 panic 统一折算为该实体的 OracleFailure,
    /// 不向外传播 (两种执行模式下语义一致)。
    fn forecast_one(
        &self,
        series: &TimeSeries,
        oracle: &dyn ForecastOracle,
    ) -> Result<Vec<ForecastPoint>, SkippedEntity> {
        let skip = |message: String| SkippedEntity {
            key: series.key.clone(),
            reason: SkipReason::OracleFailure { message },
        };

        let last_fit_period = match series.last_period() {
            Some(d) => self.granularity.truncate(d),
            None => return Err(skip("空序列".to_string())),
        };

        // 月粒度多取一个期间的天数: 预测自拟合末期次日开始,
        // 首月与拟合末期重叠且不完整,重采样后会被过滤掉
        let horizon_days = self.granularity.horizon_in_days(self.horizon_periods)
            + match self.granularity {
                PeriodGranularity::Monthly => 30,
                PeriodGranularity::Daily => 0,
            };

        let predicted = panic::catch_unwind(AssertUnwindSafe(|| {
            oracle
                .fit(series)
                .and_then(|model| model.predict(horizon_days))
        }));

        let daily = match predicted {
            Ok(Ok(points)) => points,
            Ok(Err(e)) => return Err(skip(e.to_string())),
            Err(payload) => return Err(skip(panic_message(payload))),
        };

        // 日频 → 期间粒度 (期间内取均值),仅保留拟合末期之后的
        // horizon 个期间
        let resampled = resample_mean(&daily, self.granularity);
        let points: Vec<ForecastPoint> = resampled
            .into_iter()
            .filter(|(period, _)| *period > last_fit_period)
            .take(self.horizon_periods)
            .map(|(period, forecast_qty)| ForecastPoint {
                part_no: series.key.part_no.clone(),
                region: series.key.region.clone(),
                period,
                forecast_qty,
            })
            .collect();

        if points.len() < self.horizon_periods {
            return Err(skip(format!(
                "Oracle 输出覆盖不足: 需要 {} 个期间,得到 {}",
                self.horizon_periods,
                points.len()
            )));
        }

        Ok(points)
    }
}

/// 日频预测点按期间取均值重采样,输出按期间升序
fn resample_mean(
    daily: &[(NaiveDate, f64)],
    granularity: PeriodGranularity,
) -> Vec<(NaiveDate, f64)> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, value) in daily {
        let entry = buckets.entry(granularity.truncate(*date)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(period, (sum, count))| (period, sum / count as f64))
        .collect()
}

/// 提取 panic 负载中的可读消息
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "oracle panic".to_string()
    }
}
