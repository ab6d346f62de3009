// ==========================================
// 需求预测系统 - 领域层
// ==========================================
// 职责: 管道各阶段间传递的值对象
// 红线: 值对象创建后只读 (append-only 管道)
// ==========================================

pub mod forecast;
pub mod inventory;
pub mod risk;
pub mod sales;
pub mod types;

// 重导出核心类型
pub use forecast::{AggregateForecast, ForecastBatch, ForecastPoint, SkippedEntity};
pub use inventory::{BackorderSnapshot, InventorySnapshot};
pub use risk::{ReconciliationRow, RiskRow};
pub use sales::{EntityKey, SalesRecord, TimeSeries};
pub use types::{OverstockStatus, PeriodGranularity, SkipReason};
