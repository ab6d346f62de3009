// ==========================================
// 需求预测系统 - 库存风险领域模型
// ==========================================
// 职责: 风险分析行与对账分类行
// 公式: overstock_risk = (在库 + 在途) - (欠交 + 预测)
// ==========================================

use crate::domain::types::OverstockStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskRow - 单料号风险分析行
// ==========================================
// 仅对进入预测的料号产出;快照缺失字段按 0 参与计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub part_no: String,        // 料号

    // ===== 预测侧 =====
    pub forecast_qty: f64,      // 最末期间预测销量 (跨区域求和)

    // ===== 库存侧 =====
    pub on_hand: f64,           // 在库量
    pub in_transit: f64,        // 在途量
    pub backorder_qty: f64,     // 欠交数量

    // ===== 风险评估 =====
    pub overstock_risk: f64,    // 过剩风险值
    pub overstock_flag: bool,   // 过剩标志 (risk > 0)
}

impl RiskRow {
    /// 按公式计算风险并构造行
    pub fn assess(
        part_no: String,
        forecast_qty: f64,
        on_hand: f64,
        in_transit: f64,
        backorder_qty: f64,
    ) -> Self {
        let overstock_risk = (on_hand + in_transit) - (backorder_qty + forecast_qty);
        Self {
            part_no,
            forecast_qty,
            on_hand,
            in_transit,
            backorder_qty,
            overstock_risk,
            overstock_flag: overstock_risk > 0.0,
        }
    }
}

// ==========================================
// ReconciliationRow - 对账分类行
// ==========================================
// 模型标志 × 外部标志 → 状态 (总函数,无歧义)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub part_no: String,            // 料号
    pub model_flag: bool,           // 模型过剩标志
    pub externally_flagged: bool,   // 外部已标记
    pub status: OverstockStatus,    // 分类状态
}
