// ==========================================
// 结果导出集成测试
// ==========================================
// 测试目标: 五个输出表写盘,列顺序与文件名稳定
// ==========================================

use chrono::{NaiveDate, Utc};
use demand_planner::engine::PlanResult;
use demand_planner::{
    export, AggregateForecast, EntityKey, ForecastPoint, OverstockStatus,
    ReconciliationRow, RiskRow, SkipReason, SkippedEntity,
};
use uuid::Uuid;

fn sample_result() -> PlanResult {
    PlanResult {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now().naive_utc(),
        forecasts: vec![ForecastPoint {
            part_no: "PN-1".to_string(),
            region: "APAC".to_string(),
            period: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            forecast_qty: 18.5,
        }],
        aggregates: vec![AggregateForecast {
            period: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            total_forecast_qty: 18.5,
        }],
        risk_rows: vec![RiskRow {
            part_no: "PN-1".to_string(),
            forecast_qty: 18.5,
            on_hand: 100.0,
            in_transit: 20.0,
            backorder_qty: 10.0,
            overstock_risk: 91.5,
            overstock_flag: true,
        }],
        reconciliation: vec![ReconciliationRow {
            part_no: "PN-1".to_string(),
            model_flag: true,
            externally_flagged: true,
            status: OverstockStatus::ConfirmedBoth,
        }],
        skipped: vec![SkippedEntity {
            key: EntityKey::new("PN-2", "ALL"),
            reason: SkipReason::InsufficientHistory { distinct_periods: 1 },
        }],
    }
}

#[test]
fn test_export_writes_all_five_tables() {
    let dir = tempfile::tempdir().unwrap();

    export::export_plan_result(dir.path(), &sample_result()).unwrap();

    for name in [
        "forecast.csv",
        "aggregate_forecast.csv",
        "risk.csv",
        "reconciliation.csv",
        "skipped.csv",
    ] {
        assert!(dir.path().join(name).exists(), "{} 缺失", name);
    }
}

#[test]
fn test_export_headers_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    export::export_plan_result(dir.path(), &sample_result()).unwrap();

    let risk = std::fs::read_to_string(dir.path().join("risk.csv")).unwrap();
    let mut lines = risk.lines();
    assert_eq!(
        lines.next(),
        Some("part_no,forecast_qty,on_hand,in_transit,backorder_qty,overstock_risk,overstock_flag")
    );
    assert_eq!(lines.next(), Some("PN-1,18.5,100,20,10,91.5,true"));

    let reconciliation =
        std::fs::read_to_string(dir.path().join("reconciliation.csv")).unwrap();
    assert!(reconciliation.contains("PN-1,true,true,CONFIRMED_BOTH"));

    let skipped = std::fs::read_to_string(dir.path().join("skipped.csv")).unwrap();
    assert!(skipped.contains("PN-2,ALL,insufficient history: 1 distinct periods"));
}
