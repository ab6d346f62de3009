// ==========================================
// 需求预测系统 - 结果导出
// ==========================================
// 职责: 四张输出表 + 跳过清单 → CSV (列顺序稳定,一行一记录)
// 格式: 期间 %Y-%m-%d,布尔 true/false,数值原样
// ==========================================

use crate::domain::forecast::{AggregateForecast, ForecastPoint, SkippedEntity};
use crate::domain::risk::{ReconciliationRow, RiskRow};
use crate::engine::PlanResult;
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

// CSV 表头 (列顺序即导出顺序,不可随意调整)
const FORECAST_HEADER: &[&str] = &["part_no", "region", "period", "forecast_qty"];
const AGGREGATE_HEADER: &[&str] = &["period", "total_forecast_qty"];
const RISK_HEADER: &[&str] = &[
    "part_no",
    "forecast_qty",
    "on_hand",
    "in_transit",
    "backorder_qty",
    "overstock_risk",
    "overstock_flag",
];
const RECONCILIATION_HEADER: &[&str] =
    &["part_no", "model_flag", "externally_flagged", "status"];
const SKIPPED_HEADER: &[&str] = &["part_no", "region", "reason"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 逐实体预测表
pub fn write_forecasts<W: Write>(writer: W, points: &[ForecastPoint]) -> csv::Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(FORECAST_HEADER)?;
    for p in points {
        w.write_record(&[
            p.part_no.clone(),
            p.region.clone(),
            p.period.format(DATE_FORMAT).to_string(),
            p.forecast_qty.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// 聚合预测表
pub fn write_aggregates<W: Write>(
    writer: W,
    aggregates: &[AggregateForecast],
) -> csv::Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(AGGREGATE_HEADER)?;
    for a in aggregates {
        w.write_record(&[
            a.period.format(DATE_FORMAT).to_string(),
            a.total_forecast_qty.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// 风险分析表
pub fn write_risk_rows<W: Write>(writer: W, rows: &[RiskRow]) -> csv::Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(RISK_HEADER)?;
    for r in rows {
        w.write_record(&[
            r.part_no.clone(),
            r.forecast_qty.to_string(),
            r.on_hand.to_string(),
            r.in_transit.to_string(),
            r.backorder_qty.to_string(),
            r.overstock_risk.to_string(),
            r.overstock_flag.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// 对账分类表
pub fn write_reconciliation<W: Write>(
    writer: W,
    rows: &[ReconciliationRow],
) -> csv::Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(RECONCILIATION_HEADER)?;
    for r in rows {
        w.write_record(&[
            r.part_no.clone(),
            r.model_flag.to_string(),
            r.externally_flagged.to_string(),
            r.status.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// 跳过清单 (审计用)
pub fn write_skipped<W: Write>(writer: W, skipped: &[SkippedEntity]) -> csv::Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(SKIPPED_HEADER)?;
    for s in skipped {
        w.write_record(&[
            s.key.part_no.clone(),
            s.key.region.clone(),
            s.reason.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// 将全部输出表写入目录 (固定文件名)
pub fn export_plan_result(dir: &Path, result: &PlanResult) -> csv::Result<()> {
    std::fs::create_dir_all(dir)?;

    write_forecasts(std::fs::File::create(dir.join("forecast.csv"))?, &result.forecasts)?;
    write_aggregates(
        std::fs::File::create(dir.join("aggregate_forecast.csv"))?,
        &result.aggregates,
    )?;
    write_risk_rows(std::fs::File::create(dir.join("risk.csv"))?, &result.risk_rows)?;
    write_reconciliation(
        std::fs::File::create(dir.join("reconciliation.csv"))?,
        &result.reconciliation,
    )?;
    write_skipped(std::fs::File::create(dir.join("skipped.csv"))?, &result.skipped)?;

    info!(dir = %dir.display(), "输出表导出完成");
    Ok(())
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_forecast_csv_column_order_stable() {
        let points = vec![ForecastPoint {
            part_no: "PN-1".to_string(),
            region: "APAC".to_string(),
            period: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            forecast_qty: 12.5,
        }];

        let mut buf = Vec::new();
        write_forecasts(&mut buf, &points).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("part_no,region,period,forecast_qty"));
        assert_eq!(lines.next(), Some("PN-1,APAC,2024-04-01,12.5"));
    }

    #[test]
    fn test_reconciliation_csv_status_screaming_case() {
        let rows = vec![ReconciliationRow {
            part_no: "PN-1".to_string(),
            model_flag: true,
            externally_flagged: false,
            status: crate::domain::OverstockStatus::NewFromModel,
        }];

        let mut buf = Vec::new();
        write_reconciliation(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("PN-1,true,false,NEW_FROM_MODEL"));
    }
}
