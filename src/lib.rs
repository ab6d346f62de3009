// ==========================================
// 需求预测与补货风险分析 - 核心库
// ==========================================
// 技术栈: Rust (纯内存管道,无持久化)
// 系统定位: 决策支持系统 (预测编排 + 风险对账)
// 数据流: 重塑 → 校验 → 预测 → {聚合, 风险} → 对账
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值对象与类型
pub mod domain;

// 导入层 - 外部表格数据重塑
pub mod importer;

// Oracle 层 - 可插拔预测能力
pub mod oracle;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 管道运行参数
pub mod config;

// 导出层 - 结果表 CSV 序列化
pub mod export;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AggregateForecast, BackorderSnapshot, EntityKey, ForecastBatch, ForecastPoint,
    InventorySnapshot, OverstockStatus, PeriodGranularity, ReconciliationRow, RiskRow,
    SalesRecord, SkippedEntity, SkipReason, TimeSeries,
};

// 引擎
pub use engine::{
    DemandPlanOrchestrator, ForecastAggregator, ForecastEngine, GroupKey, PlanError,
    PlanInput, PlanResult, ReconciliationEngine, RiskEngine, SeriesValidator,
};

// 导入
pub use importer::{ImportError, Reshaper, ReshapeReport, SnapshotMapper};

// Oracle
pub use oracle::{FittedModel, ForecastOracle, LinearTrendOracle, OracleError};

// 配置
pub use config::{ConfigError, PlannerConfig};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
