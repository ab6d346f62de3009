// ==========================================
// 需求预测系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 结构性错误 (整批失败) vs 单元格拒绝 (仅该行失败)
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
///
/// 此处只定义结构性错误: 在任何逐行处理开始之前检测,
/// 整批输入被拒绝。单元格级问题记录在 ReshapeReport 中。
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 (CLI 适配层) =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构性错误 =====
    #[error("缺少必需的标识列: {0}（期望列名之一: {1}）")]
    MissingIdentityColumn(String, String),

    #[error("期间列标签非法 (列 \"{label}\"): 期望 YYYY-MM 或 YYYY-MM-DD")]
    PeriodLabelError { label: String },

    #[error("输入表为空: {0}")]
    EmptyTable(String),
}

/// 导入模块 Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
