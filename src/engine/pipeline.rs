// ==========================================
// 需求预测系统 - 管道编排器
// ==========================================
// 职责: 串联 校验 → 预测 → {聚合, 风险} → 对账 各引擎
// 红线: 配置非法在任何 Oracle 调用之前失败;
//       有效实体为空不是错误 (返回空结果 + 完整跳过清单)
// 数据流: 单向,各阶段消费上一阶段的不可变快照
// ==========================================

use crate::config::{ConfigError, PlannerConfig};
use crate::domain::forecast::{AggregateForecast, ForecastPoint, SkippedEntity};
use crate::domain::inventory::{BackorderSnapshot, InventorySnapshot};
use crate::domain::risk::{ReconciliationRow, RiskRow};
use crate::domain::sales::{SalesRecord, TimeSeries};
use crate::engine::aggregator::{ForecastAggregator, GroupKey};
use crate::engine::forecaster::ForecastEngine;
use crate::engine::reconciliation::ReconciliationEngine;
use crate::engine::risk::RiskEngine;
use crate::engine::validator::SeriesValidator;
use crate::importer::ImportError;
use crate::oracle::ForecastOracle;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

// ==========================================
// 管道错误
// ==========================================
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("输入错误: {0}")]
    Import(#[from] ImportError),
}

// ==========================================
// PlanInput - 管道输入 (重塑后的不可变快照)
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PlanInput {
    pub sales_records: Vec<SalesRecord>,
    pub inventory: HashMap<String, InventorySnapshot>,
    pub backorders: HashMap<String, BackorderSnapshot>,
    pub flagged: HashSet<String>,
}

// ==========================================
// PlanResult - 管道输出
// ==========================================
// 四张输出表 + 跳过清单,全部为扁平结构,可直接导出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub run_id: Uuid,                           // 本次运行标识
    pub generated_at: NaiveDateTime,            // 生成时间
    pub forecasts: Vec<ForecastPoint>,          // 逐实体预测表
    pub aggregates: Vec<AggregateForecast>,     // 聚合预测表
    pub risk_rows: Vec<RiskRow>,                // 风险分析表
    pub reconciliation: Vec<ReconciliationRow>, // 对账分类表
    pub skipped: Vec<SkippedEntity>,            // 跳过清单 (校验 + Oracle)
}

// ==========================================
// DemandPlanOrchestrator - 管道编排器
// ==========================================
pub struct DemandPlanOrchestrator {
    config: PlannerConfig,
    validator: SeriesValidator,
    forecaster: ForecastEngine,
    aggregator: ForecastAggregator,
    risk: RiskEngine,
    reconciliation: ReconciliationEngine,
}

impl DemandPlanOrchestrator {
    /// 创建编排器,配置在此处校验
    pub fn new(config: PlannerConfig) -> Result<Self, PlanError> {
        config.validate()?;
        Ok(Self {
            validator: SeriesValidator::new(&config),
            forecaster: ForecastEngine::new(&config),
            aggregator: ForecastAggregator::new(),
            risk: RiskEngine::new(),
            reconciliation: ReconciliationEngine::new(),
            config,
        })
    }

    /// 执行完整管道
    ///
    /// # 参数
    /// - input: 重塑后的销售记录 + 快照 (只读)
    /// - group: 聚合分组键
    /// - oracle: 预测能力
    pub fn run(
        &self,
        input: &PlanInput,
        group: &GroupKey,
        oracle: &dyn ForecastOracle,
    ) -> PlanResult {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            records = input.sales_records.len(),
            horizon = self.config.horizon_periods,
            granularity = %self.config.granularity,
            "管道启动"
        );

        // 1. 按实体构建时间序列
        let series = TimeSeries::from_records(&input.sales_records, self.config.granularity);
        info!(entities = series.len(), "时间序列构建完成");

        // 2. 序列校验
        let validated = self.validator.validate(series);

        // 3. 逐实体预测 (失败隔离)
        let mut batch = self.forecaster.forecast_all(&validated.valid, oracle);

        // 跳过清单 = 校验跳过 + Oracle 跳过
        let mut skipped = validated.skipped;
        skipped.append(&mut batch.skipped);

        // 4. 聚合 (展示用) 与 5. 风险分析 (独立消费预测输出)
        let aggregates = self.aggregator.aggregate(&batch.points, group);
        let risk_rows = self
            .risk
            .analyze(&batch.points, &input.inventory, &input.backorders);

        // 6. 对账分类
        let reconciliation =
            self.reconciliation
                .reconcile(&risk_rows, &input.flagged, &skipped);

        info!(
            %run_id,
            forecasts = batch.points.len(),
            aggregates = aggregates.len(),
            risk_rows = risk_rows.len(),
            reconciliation = reconciliation.len(),
            skipped = skipped.len(),
            "管道完成"
        );

        PlanResult {
            run_id,
            generated_at: Utc::now().naive_utc(),
            forecasts: batch.points,
            aggregates,
            risk_rows,
            reconciliation,
            skipped,
        }
    }
}
