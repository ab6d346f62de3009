// ==========================================
// 需求预测系统 - 销售历史领域模型
// ==========================================
// 职责: 扁平化销售记录与按实体的时间序列
// 红线: 时间序列期间严格递增,无重复期间
// ==========================================

use crate::domain::types::PeriodGranularity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// EntityKey - 预测实体键
// ==========================================
// 实体 = (料号, 地理区域),区域缺省为 "ALL"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub part_no: String, // 料号 (PN)
    pub region: String,  // 地理区域
}

impl EntityKey {
    pub fn new(part_no: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            part_no: part_no.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.part_no, self.region)
    }
}

// ==========================================
// SalesRecord - 销售记录
// ==========================================
// Reshaper 输出,创建后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub part_no: String,    // 料号
    pub region: String,     // 地理区域
    pub period: NaiveDate,  // 期间 (月粒度时为当月1日)
    pub quantity: f64,      // 销量 (非负,由 Reshaper 保证)
}

impl SalesRecord {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.part_no.clone(), self.region.clone())
    }
}

// ==========================================
// TimeSeries - 单实体时间序列
// ==========================================
// 同期间销量求和,期间排序后严格递增
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub key: EntityKey,
    pub points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    /// 从销售记录集合构建全部实体的时间序列
    ///
    /// # 规则
    /// - 按 (part_no, region) 分组
    /// - 同一期间的销量求和 (对应源数据多行同月的情形)
    /// - 期间按粒度归一化后升序排列
    ///
    /// # 返回
    /// 按 EntityKey 升序的时间序列列表 (确定性顺序,便于测试)
    pub fn from_records(
        records: &[SalesRecord],
        granularity: PeriodGranularity,
    ) -> Vec<TimeSeries> {
        let mut grouped: BTreeMap<EntityKey, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

        for record in records {
            let period = granularity.truncate(record.period);
            *grouped
                .entry(record.key())
                .or_default()
                .entry(period)
                .or_insert(0.0) += record.quantity;
        }

        grouped
            .into_iter()
            .map(|(key, by_period)| TimeSeries {
                key,
                points: by_period.into_iter().collect(),
            })
            .collect()
    }

    /// 期间数 (BTreeMap 构建保证无重复,即不同期间数)
    pub fn distinct_periods(&self) -> usize {
        self.points.len()
    }

    /// 不同销量值的个数 (用于退化序列判定)
    ///
    /// 浮点值按 to_bits 去重,足以识别完全常量的序列
    pub fn distinct_quantities(&self) -> usize {
        let mut bits: Vec<u64> = self.points.iter().map(|(_, q)| q.to_bits()).collect();
        bits.sort_unstable();
        bits.dedup();
        bits.len()
    }

    /// 序列末期间 (预测起点的前一期)
    pub fn last_period(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(part_no: &str, region: &str, period: NaiveDate, quantity: f64) -> SalesRecord {
        SalesRecord {
            part_no: part_no.to_string(),
            region: region.to_string(),
            period,
            quantity,
        }
    }

    #[test]
    fn test_from_records_sums_duplicate_periods() {
        // 同月两笔销量求和,期间归一化到当月1日
        let records = vec![
            record("PN-1", "APAC", d(2024, 1, 5), 10.0),
            record("PN-1", "APAC", d(2024, 1, 20), 5.0),
            record("PN-1", "APAC", d(2024, 2, 1), 7.0),
        ];

        let series = TimeSeries::from_records(&records, PeriodGranularity::Monthly);

        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].points,
            vec![(d(2024, 1, 1), 15.0), (d(2024, 2, 1), 7.0)]
        );
    }

    #[test]
    fn test_from_records_periods_strictly_increasing() {
        // 乱序输入,输出仍严格递增
        let records = vec![
            record("PN-1", "ALL", d(2024, 3, 1), 1.0),
            record("PN-1", "ALL", d(2024, 1, 1), 2.0),
            record("PN-1", "ALL", d(2024, 2, 1), 3.0),
        ];

        let series = TimeSeries::from_records(&records, PeriodGranularity::Monthly);
        let periods: Vec<NaiveDate> = series[0].points.iter().map(|(d, _)| *d).collect();

        assert!(periods.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_records_splits_by_region() {
        // 同料号不同区域是不同实体
        let records = vec![
            record("PN-1", "APAC", d(2024, 1, 1), 1.0),
            record("PN-1", "EMEA", d(2024, 1, 1), 2.0),
        ];

        let series = TimeSeries::from_records(&records, PeriodGranularity::Monthly);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].key, EntityKey::new("PN-1", "APAC"));
        assert_eq!(series[1].key, EntityKey::new("PN-1", "EMEA"));
    }

    #[test]
    fn test_distinct_quantities_constant_series() {
        let records = vec![
            record("PN-1", "ALL", d(2024, 1, 1), 5.0),
            record("PN-1", "ALL", d(2024, 2, 1), 5.0),
            record("PN-1", "ALL", d(2024, 3, 1), 5.0),
        ];

        let series = TimeSeries::from_records(&records, PeriodGranularity::Monthly);

        assert_eq!(series[0].distinct_periods(), 3);
        assert_eq!(series[0].distinct_quantities(), 1);
    }
}
