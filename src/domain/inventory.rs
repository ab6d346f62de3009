// ==========================================
// 需求预测系统 - 库存/欠交快照领域模型
// ==========================================
// 职责: 风险分析的外部状态输入
// 约束: 每个料号至多一条,缺失字段按 0 处理
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// InventorySnapshot - 库存快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub part_no: String,    // 料号
    pub on_hand: f64,       // 在库量
    pub in_transit: f64,    // 在途量
}

// ==========================================
// BackorderSnapshot - 欠交快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackorderSnapshot {
    pub part_no: String,        // 料号
    pub backorder_qty: f64,     // 欠交数量
}
