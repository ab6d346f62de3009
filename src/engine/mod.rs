// ==========================================
// 需求预测系统 - 引擎层
// ==========================================
// 职责: 业务规则引擎,纯内存计算
// 红线: 所有跳过/排除决定必须输出 reason
// ==========================================

pub mod aggregator;
pub mod forecaster;
pub mod pipeline;
pub mod reconciliation;
pub mod risk;
pub mod validator;

// 重导出核心引擎
pub use aggregator::{ForecastAggregator, GroupKey};
pub use forecaster::ForecastEngine;
pub use pipeline::{DemandPlanOrchestrator, PlanError, PlanInput, PlanResult};
pub use reconciliation::ReconciliationEngine;
pub use risk::RiskEngine;
pub use validator::{SeriesValidator, ValidatedSeries};
