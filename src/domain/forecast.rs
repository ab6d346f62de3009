// ==========================================
// 需求预测系统 - 预测结果领域模型
// ==========================================
// 职责: 预测引擎输出的值对象
// 红线: ForecastPoint 不做裁剪,Oracle 输出原样传递
// ==========================================

use crate::domain::sales::EntityKey;
use crate::domain::types::SkipReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastPoint - 单实体单期间预测值
// ==========================================
// forecast_qty 可为负数或小数 (模型期望值,不裁剪)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub part_no: String,      // 料号
    pub region: String,       // 地理区域
    pub period: NaiveDate,    // 预测期间
    pub forecast_qty: f64,    // 预测销量
}

impl ForecastPoint {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.part_no.clone(), self.region.clone())
    }
}

// ==========================================
// AggregateForecast - 分组聚合预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateForecast {
    pub period: NaiveDate,          // 期间
    pub total_forecast_qty: f64,    // 组内预测销量合计
}

// ==========================================
// SkippedEntity - 被跳过实体
// ==========================================
// 校验不通过或 Oracle 失败的实体,带原因供审计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntity {
    pub key: EntityKey,
    pub reason: SkipReason,
}

// ==========================================
// ForecastBatch - 预测批次输出
// ==========================================
// 预测引擎的扇入结果: 成功的预测点 + 跳过清单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastBatch {
    pub points: Vec<ForecastPoint>,
    pub skipped: Vec<SkippedEntity>,
}

impl ForecastBatch {
    /// 成功预测的实体数
    pub fn entity_count(&self) -> usize {
        let mut unique: Vec<EntityKey> = self.points.iter().map(|p| p.key()).collect();
        unique.sort();
        unique.dedup();
        unique.len()
    }
}
