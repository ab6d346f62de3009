// ==========================================
// 需求预测系统 - 过剩对账分类引擎
// ==========================================
// 职责: 模型过剩标志 × 外部已标记集合 → 五类状态
// 红线: {T,F}² 上的总函数,按优先级无歧义;
//       外部已标记但从未预测的料号必须保留,不得静默丢弃
// ==========================================

use crate::domain::forecast::SkippedEntity;
use crate::domain::risk::{ReconciliationRow, RiskRow};
use crate::domain::types::OverstockStatus;
use std::collections::HashSet;
use tracing::info;

// ==========================================
// ReconciliationEngine - 对账分类引擎
// ==========================================
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 对账分类
    ///
    /// # 优先级 (对每个风险行)
    /// - 模型√ 外部√ → ConfirmedBoth
    /// - 模型√ 外部× → NewFromModel
    /// - 模型× 外部√ → PreviouslyFlaggedOnly
    /// - 模型× 外部× → Clear
    ///
    /// # 附加规则
    /// 外部集合中从未出现在风险行里的料号 (被校验器/Oracle 跳过,
    /// 或根本没有销售历史) 产出 FlaggedUnforecastable 行,
    /// 信息不丢失。skipped 仅用于日志佐证,分类以风险行缺席为准。
    ///
    /// # 返回
    /// 按料号升序的分类行
    pub fn reconcile(
        &self,
        risk_rows: &[RiskRow],
        flagged: &HashSet<String>,
        skipped: &[SkippedEntity],
    ) -> Vec<ReconciliationRow> {
        let mut rows: Vec<ReconciliationRow> = risk_rows
            .iter()
            .map(|risk| {
                let externally_flagged = flagged.contains(&risk.part_no);
                let status = classify(risk.overstock_flag, externally_flagged);
                ReconciliationRow {
                    part_no: risk.part_no.clone(),
                    model_flag: risk.overstock_flag,
                    externally_flagged,
                    status,
                }
            })
            .collect();

        // 外部已标记但无风险行的料号
        let forecasted: HashSet<&str> =
            risk_rows.iter().map(|r| r.part_no.as_str()).collect();
        let mut unforecastable: Vec<&String> = flagged
            .iter()
            .filter(|part_no| !forecasted.contains(part_no.as_str()))
            .collect();
        unforecastable.sort();

        for part_no in unforecastable {
            let skip_reason = skipped
                .iter()
                .find(|s| s.key.part_no == *part_no)
                .map(|s| s.reason.to_string());
            info!(
                part_no = %part_no,
                skip_reason = skip_reason.as_deref().unwrap_or("无销售历史"),
                "外部已标记料号未进入预测"
            );
            rows.push(ReconciliationRow {
                part_no: part_no.clone(),
                model_flag: false,
                externally_flagged: true,
                status: OverstockStatus::FlaggedUnforecastable,
            });
        }

        rows.sort_by(|a, b| a.part_no.cmp(&b.part_no));
        rows
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// {模型标志, 外部标志} → 状态,总函数
fn classify(model_flag: bool, externally_flagged: bool) -> OverstockStatus {
    match (model_flag, externally_flagged) {
        (true, true) => OverstockStatus::ConfirmedBoth,
        (true, false) => OverstockStatus::NewFromModel,
        (false, true) => OverstockStatus::PreviouslyFlaggedOnly,
        (false, false) => OverstockStatus::Clear,
    }
}
