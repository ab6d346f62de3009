// ==========================================
// 需求预测系统 - 预测聚合引擎
// ==========================================
// 职责: 按分组键对预测点逐期间求和
// 口径: 输出行集合 = 组内期间并集;实体缺失某期间不参与
//       该期间求和 (合计与按 0 补齐完全一致,口径固定不设开关)
// ==========================================

use crate::domain::forecast::{AggregateForecast, ForecastPoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// GroupKey - 分组键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// 全部实体
    All,
    /// 指定区域内的实体
    Region(String),
}

impl GroupKey {
    fn matches(&self, point: &ForecastPoint) -> bool {
        match self {
            GroupKey::All => true,
            GroupKey::Region(region) => point.region == *region,
        }
    }
}

// ==========================================
// ForecastAggregator - 预测聚合引擎
// ==========================================
pub struct ForecastAggregator;

impl ForecastAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 组内逐期间求和
    ///
    /// # 口径
    /// - 输出行集合 = 组内全部实体期间的并集 (实体 horizon 错位时
    ///   任何实体出现过的期间都不丢失)
    /// - 实体缺失某期间: 不参与该期间求和。求和对缺失项按 0 补齐
    ///   与直接略过算术恒等,因此口径固定,不提供配置开关
    ///
    /// # 性质
    /// 求和满足交换律/结合律: 不相交实体集分别聚合再相加,
    /// 等于并集一次聚合
    pub fn aggregate(
        &self,
        points: &[ForecastPoint],
        group: &GroupKey,
    ) -> Vec<AggregateForecast> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut matched = 0usize;
        for point in points.iter().filter(|p| group.matches(p)) {
            *totals.entry(point.period).or_insert(0.0) += point.forecast_qty;
            matched += 1;
        }

        debug!(
            group = ?group,
            points = matched,
            periods = totals.len(),
            "聚合完成"
        );

        totals
            .into_iter()
            .map(|(period, total_forecast_qty)| AggregateForecast {
                period,
                total_forecast_qty,
            })
            .collect()
    }
}

impl Default for ForecastAggregator {
    fn default() -> Self {
        Self::new()
    }
}
