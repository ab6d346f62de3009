// ==========================================
// 需求预测系统 - 配置层
// ==========================================
// 职责: 管道运行参数管理
// 来源: 缺省值 / JSON 配置文件
// ==========================================

pub mod planner_config;

// 重导出核心配置类型
pub use planner_config::{ConfigError, PlannerConfig};
