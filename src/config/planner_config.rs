// ==========================================
// 需求预测系统 - 规划配置
// ==========================================
// 职责: 管道运行参数 (horizon/阈值/策略)
// 红线: 配置非法时在任何 Oracle 调用之前失败
// ==========================================

use crate::domain::types::PeriodGranularity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值非法 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// PlannerConfig - 规划配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// 预测期数 (horizon),≥ 1
    pub horizon_periods: usize,

    /// 实体进入预测所需的最少不同期间数 M
    pub min_distinct_periods: usize,

    /// 实体进入预测所需的最少不同销量值数
    pub min_distinct_quantities: usize,

    /// 期间粒度
    pub granularity: PeriodGranularity,

    /// 预测阶段并行工作线程数 (0/1 = 顺序执行)
    pub parallel_workers: usize,

    /// 输入缺失区域列时的缺省区域
    pub default_region: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            horizon_periods: 6,
            min_distinct_periods: 3,
            min_distinct_quantities: 2,
            granularity: PeriodGranularity::Monthly,
            parallel_workers: 0,
            default_region: "ALL".to_string(),
        }
    }
}

impl PlannerConfig {
    /// 从 JSON 文件加载配置 (缺失字段取缺省值)
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let config: PlannerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置合法性
    ///
    /// 管道入口调用,保证非法配置不会触发任何实体预测
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_periods == 0 {
            return Err(ConfigError::InvalidValue {
                key: "horizon_periods".to_string(),
                message: "必须 >= 1".to_string(),
            });
        }
        if self.min_distinct_periods == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_distinct_periods".to_string(),
                message: "必须 >= 1".to_string(),
            });
        }
        if self.min_distinct_quantities == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_distinct_quantities".to_string(),
                message: "必须 >= 1".to_string(),
            });
        }
        Ok(())
    }
}
