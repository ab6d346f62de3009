// ==========================================
// 需求预测系统 - 库存风险分析引擎
// ==========================================
// 职责: 取各料号最末期间预测,与库存/欠交快照左连接,
//       计算过剩风险并打标
// 公式: overstock_risk = (在库 + 在途) - (欠交 + 预测)
// 约定: 快照缺失按 0 连接 (不是错误);未预测料号不产出行
// ==========================================

use crate::domain::forecast::ForecastPoint;
use crate::domain::inventory::{BackorderSnapshot, InventorySnapshot};
use crate::domain::risk::RiskRow;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info};

// ==========================================
// RiskEngine - 风险分析引擎
// ==========================================
// 无状态引擎,快照由调用方提供
pub struct RiskEngine;

impl RiskEngine {
    pub fn new() -> Self {
        Self
    }

    /// 生成全部已预测料号的风险行
    ///
    /// # 规则
    /// - "当前预测" = 该料号最末预测期间上跨区域求和的预测量
    /// - 料号在任一快照缺失: 对应字段按 0 (预测存在即有意义)
    /// - 料号仅在快照中出现而从未预测: 不产出行
    ///
    /// # 返回
    /// 按料号升序的 RiskRow 列表 (导出顺序稳定)
    pub fn analyze(
        &self,
        points: &[ForecastPoint],
        inventory: &HashMap<String, InventorySnapshot>,
        backorders: &HashMap<String, BackorderSnapshot>,
    ) -> Vec<RiskRow> {
        // 1. 各料号最末期间
        let mut latest_period: HashMap<&str, NaiveDate> = HashMap::new();
        for point in points {
            latest_period
                .entry(point.part_no.as_str())
                .and_modify(|d| {
                    if point.period > *d {
                        *d = point.period;
                    }
                })
                .or_insert(point.period);
        }

        // 2. 最末期间预测量跨区域求和
        let mut current_forecast: HashMap<&str, f64> = HashMap::new();
        for point in points {
            if latest_period.get(point.part_no.as_str()) == Some(&point.period) {
                *current_forecast.entry(point.part_no.as_str()).or_insert(0.0) +=
                    point.forecast_qty;
            }
        }

        // 3. 左连接快照并评估
        let mut rows: Vec<RiskRow> = current_forecast
            .into_iter()
            .map(|(part_no, forecast_qty)| {
                let (on_hand, in_transit) = inventory
                    .get(part_no)
                    .map(|s| (s.on_hand, s.in_transit))
                    .unwrap_or((0.0, 0.0));
                let backorder_qty = backorders
                    .get(part_no)
                    .map(|s| s.backorder_qty)
                    .unwrap_or(0.0);

                if !inventory.contains_key(part_no) && !backorders.contains_key(part_no) {
                    debug!(part_no, "料号不在任何快照中,按零库存评估");
                }

                RiskRow::assess(
                    part_no.to_string(),
                    forecast_qty,
                    on_hand,
                    in_transit,
                    backorder_qty,
                )
            })
            .collect();

        rows.sort_by(|a, b| a.part_no.cmp(&b.part_no));

        info!(
            rows = rows.len(),
            flagged = rows.iter().filter(|r| r.overstock_flag).count(),
            "风险分析完成"
        );
        rows
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    fn point(part_no: &str, region: &str, m: u32, qty: f64) -> ForecastPoint {
        ForecastPoint {
            part_no: part_no.to_string(),
            region: region.to_string(),
            period: d(m),
            forecast_qty: qty,
        }
    }

    fn inventory(entries: &[(&str, f64, f64)]) -> HashMap<String, InventorySnapshot> {
        entries
            .iter()
            .map(|(p, oh, it)| {
                (
                    p.to_string(),
                    InventorySnapshot {
                        part_no: p.to_string(),
                        on_hand: *oh,
                        in_transit: *it,
                    },
                )
            })
            .collect()
    }

    fn backorders(entries: &[(&str, f64)]) -> HashMap<String, BackorderSnapshot> {
        entries
            .iter()
            .map(|(p, bo)| {
                (
                    p.to_string(),
                    BackorderSnapshot {
                        part_no: p.to_string(),
                        backorder_qty: *bo,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_risk_formula_positive_flag() {
        // 在库100 + 在途20 - (欠交10 + 预测50) = 60 > 0 → 标记
        let points = vec![point("PN-1", "ALL", 6, 50.0)];

        let rows = RiskEngine::new().analyze(
            &points,
            &inventory(&[("PN-1", 100.0, 20.0)]),
            &backorders(&[("PN-1", 10.0)]),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].overstock_risk, 60.0);
        assert!(rows[0].overstock_flag);
    }

    #[test]
    fn test_risk_formula_negative_no_flag() {
        // 预测150: 120 - 160 = -40 → 不标记
        let points = vec![point("PN-1", "ALL", 6, 150.0)];

        let rows = RiskEngine::new().analyze(
            &points,
            &inventory(&[("PN-1", 100.0, 20.0)]),
            &backorders(&[("PN-1", 10.0)]),
        );

        assert_eq!(rows[0].overstock_risk, -40.0);
        assert!(!rows[0].overstock_flag);
    }

    #[test]
    fn test_latest_period_selected() {
        // 取最末期间 (6月) 的预测,不是首期间
        let points = vec![
            point("PN-1", "ALL", 4, 10.0),
            point("PN-1", "ALL", 5, 20.0),
            point("PN-1", "ALL", 6, 30.0),
        ];

        let rows = RiskEngine::new().analyze(&points, &HashMap::new(), &HashMap::new());

        assert_eq!(rows[0].forecast_qty, 30.0);
    }

    #[test]
    fn test_latest_period_sums_across_regions() {
        let points = vec![
            point("PN-1", "APAC", 6, 30.0),
            point("PN-1", "EMEA", 6, 12.0),
        ];

        let rows = RiskEngine::new().analyze(&points, &HashMap::new(), &HashMap::new());

        assert_eq!(rows[0].forecast_qty, 42.0);
    }

    #[test]
    fn test_entity_absent_from_both_snapshots() {
        // 连接缺失不是错误: risk = -forecast,flag = false
        let points = vec![point("PN-1", "ALL", 6, 50.0)];

        let rows = RiskEngine::new().analyze(&points, &HashMap::new(), &HashMap::new());

        assert_eq!(rows[0].on_hand, 0.0);
        assert_eq!(rows[0].in_transit, 0.0);
        assert_eq!(rows[0].backorder_qty, 0.0);
        assert_eq!(rows[0].overstock_risk, -50.0);
        assert!(!rows[0].overstock_flag);
    }

    #[test]
    fn test_snapshot_only_entity_not_emitted() {
        // 快照有 PN-2 但从未预测 → 不产出行
        let points = vec![point("PN-1", "ALL", 6, 50.0)];

        let rows = RiskEngine::new().analyze(
            &points,
            &inventory(&[("PN-1", 10.0, 0.0), ("PN-2", 99.0, 0.0)]),
            &HashMap::new(),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].part_no, "PN-1");
    }

    #[test]
    fn test_rows_sorted_by_part_no() {
        let points = vec![
            point("PN-9", "ALL", 6, 1.0),
            point("PN-1", "ALL", 6, 1.0),
            point("PN-5", "ALL", 6, 1.0),
        ];

        let rows = RiskEngine::new().analyze(&points, &HashMap::new(), &HashMap::new());

        let order: Vec<&str> = rows.iter().map(|r| r.part_no.as_str()).collect();
        assert_eq!(order, vec!["PN-1", "PN-5", "PN-9"]);
    }
}
