// ==========================================
// 需求预测系统 - 导入层
// ==========================================
// 职责: 已解析的表格行 → 内部领域对象
// 输入形态: Vec<HashMap<列名, 单元格文本>> (上游解析器的行形态)
// ==========================================

pub mod error;
pub mod reshaper;
pub mod snapshot_mapper;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use reshaper::{RejectedCell, Reshaper, ReshapeReport};
pub use snapshot_mapper::SnapshotMapper;
