// ==========================================
// 管道端到端集成测试
// ==========================================
// 测试目标: 重塑 → 校验 → 预测 → 聚合/风险 → 对账 全链路
// 覆盖范围: horizon 性质 / 跳过原因 / 风险公式 / 五类对账状态
// ==========================================

use demand_planner::engine::{DemandPlanOrchestrator, GroupKey, PlanInput};
use demand_planner::importer::Reshaper;
use demand_planner::oracle::LinearTrendOracle;
use demand_planner::{
    BackorderSnapshot, InventorySnapshot, OverstockStatus, PlannerConfig, SkipReason,
};
use std::collections::{HashMap, HashSet};

// ==========================================
// 测试辅助函数
// ==========================================

/// 构建宽表行
fn wide_row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// 4 个月线性增长的销售历史宽表 (2 个料号)
fn two_entity_sales() -> Vec<HashMap<String, String>> {
    vec![
        wide_row(&[
            ("Part Number", "PN-1"),
            ("Geo Region", "APAC"),
            ("2024-01", "10"),
            ("2024-02", "12"),
            ("2024-03", "14"),
            ("2024-04", "16"),
        ]),
        wide_row(&[
            ("Part Number", "PN-2"),
            ("Geo Region", "APAC"),
            ("2024-01", "20"),
            ("2024-02", "21"),
            ("2024-03", "22"),
            ("2024-04", "23"),
        ]),
    ]
}

fn config(horizon: usize) -> PlannerConfig {
    PlannerConfig {
        horizon_periods: horizon,
        ..Default::default()
    }
}

fn run_pipeline(
    sales: Vec<HashMap<String, String>>,
    config: PlannerConfig,
    inventory: HashMap<String, InventorySnapshot>,
    backorders: HashMap<String, BackorderSnapshot>,
    flagged: HashSet<String>,
) -> demand_planner::PlanResult {
    let reshaper = Reshaper::new(&config);
    let report = reshaper.reshape_wide(&sales).expect("重塑失败");
    let orchestrator = DemandPlanOrchestrator::new(config).expect("配置非法");
    let input = PlanInput {
        sales_records: report.records,
        inventory,
        backorders,
        flagged,
    };
    orchestrator.run(&input, &GroupKey::All, &LinearTrendOracle::new())
}

// ==========================================
// 端到端场景测试
// ==========================================

#[test]
fn test_scenario_01_two_entities_horizon_two() {
    // 2 实体 × 4 个月历史,horizon=2 → 聚合表恰好 2 个期间
    let result = run_pipeline(
        two_entity_sales(),
        config(2),
        HashMap::new(),
        HashMap::new(),
        HashSet::new(),
    );

    assert!(result.skipped.is_empty());
    // 每实体恰好 horizon 个预测点
    assert_eq!(result.forecasts.len(), 4);
    assert_eq!(result.aggregates.len(), 2);
    // 预测期间紧跟历史末期 (2024-04) 之后
    assert_eq!(
        result.aggregates[0].period,
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    );
    assert_eq!(
        result.aggregates[1].period,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    );
}

#[test]
fn test_scenario_02_short_history_entity_skipped() {
    // PN-2 历史只有 2 个月 (< M=3) → 有效实体数减 1,
    // 跳过原因为 insufficient history
    let sales = vec![
        wide_row(&[
            ("Part Number", "PN-1"),
            ("2024-01", "10"),
            ("2024-02", "12"),
            ("2024-03", "14"),
            ("2024-04", "16"),
        ]),
        wide_row(&[
            ("Part Number", "PN-2"),
            ("2024-01", "20"),
            ("2024-02", "21"),
        ]),
    ];

    let result = run_pipeline(
        sales,
        config(2),
        HashMap::new(),
        HashMap::new(),
        HashSet::new(),
    );

    let forecast_entities: HashSet<&str> =
        result.forecasts.iter().map(|p| p.part_no.as_str()).collect();
    assert_eq!(forecast_entities.len(), 1);
    assert!(forecast_entities.contains("PN-1"));

    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].key.part_no, "PN-2");
    assert!(matches!(
        result.skipped[0].reason,
        SkipReason::InsufficientHistory { distinct_periods: 2 }
    ));
}

#[test]
fn test_scenario_03_constant_series_skipped() {
    let sales = vec![wide_row(&[
        ("Part Number", "PN-FLAT"),
        ("2024-01", "5"),
        ("2024-02", "5"),
        ("2024-03", "5"),
    ])];

    let result = run_pipeline(
        sales,
        config(2),
        HashMap::new(),
        HashMap::new(),
        HashSet::new(),
    );

    assert!(result.forecasts.is_empty());
    assert!(matches!(
        result.skipped[0].reason,
        SkipReason::ConstantSeries { distinct_quantities: 1 }
    ));
}

#[test]
fn test_scenario_04_risk_join_and_flags() {
    // PN-1 库存充足 → 过剩标记;PN-2 无快照 → risk = -forecast
    let mut inventory = HashMap::new();
    inventory.insert(
        "PN-1".to_string(),
        InventorySnapshot {
            part_no: "PN-1".to_string(),
            on_hand: 1000.0,
            in_transit: 50.0,
        },
    );
    let mut backorders = HashMap::new();
    backorders.insert(
        "PN-1".to_string(),
        BackorderSnapshot {
            part_no: "PN-1".to_string(),
            backorder_qty: 10.0,
        },
    );

    let result = run_pipeline(
        two_entity_sales(),
        config(2),
        inventory,
        backorders,
        HashSet::new(),
    );

    assert_eq!(result.risk_rows.len(), 2);
    let pn1 = result.risk_rows.iter().find(|r| r.part_no == "PN-1").unwrap();
    assert!(pn1.overstock_flag);
    assert_eq!(
        pn1.overstock_risk,
        (pn1.on_hand + pn1.in_transit) - (pn1.backorder_qty + pn1.forecast_qty)
    );

    let pn2 = result.risk_rows.iter().find(|r| r.part_no == "PN-2").unwrap();
    assert_eq!(pn2.on_hand, 0.0);
    assert_eq!(pn2.overstock_risk, -pn2.forecast_qty);
    assert!(!pn2.overstock_flag);
}

#[test]
fn test_scenario_05_reconciliation_preserves_unforecastable() {
    // 外部标记 PN-1 (已预测) 与 PN-SHORT (历史不足被跳过):
    // PN-SHORT 不得丢失,产出 FLAGGED_UNFORECASTABLE
    let mut sales = two_entity_sales();
    sales.push(wide_row(&[
        ("Part Number", "PN-SHORT"),
        ("2024-04", "3"),
    ]));

    let mut inventory = HashMap::new();
    inventory.insert(
        "PN-1".to_string(),
        InventorySnapshot {
            part_no: "PN-1".to_string(),
            on_hand: 1000.0,
            in_transit: 0.0,
        },
    );

    let flagged: HashSet<String> =
        ["PN-1", "PN-SHORT"].iter().map(|s| s.to_string()).collect();

    let result = run_pipeline(sales, config(2), inventory, HashMap::new(), flagged);

    let by_part: HashMap<&str, OverstockStatus> = result
        .reconciliation
        .iter()
        .map(|r| (r.part_no.as_str(), r.status))
        .collect();

    // PN-1: 模型√ (库存远超预测) + 外部√
    assert_eq!(by_part["PN-1"], OverstockStatus::ConfirmedBoth);
    // PN-2: 双否
    assert_eq!(by_part["PN-2"], OverstockStatus::Clear);
    // PN-SHORT: 外部已标记但未进入预测
    assert_eq!(by_part["PN-SHORT"], OverstockStatus::FlaggedUnforecastable);
}

#[test]
fn test_scenario_06_invalid_config_fails_before_any_forecast() {
    // horizon=0 在编排器构造时即失败,不会触发任何 Oracle 调用
    let result = DemandPlanOrchestrator::new(config(0));
    assert!(result.is_err());
}

#[test]
fn test_scenario_07_empty_valid_set_is_not_an_error() {
    // 全部实体被跳过 → 空结果 + 完整跳过清单,而不是报错
    let sales = vec![wide_row(&[("Part Number", "PN-1"), ("2024-01", "10")])];

    let result = run_pipeline(
        sales,
        config(2),
        HashMap::new(),
        HashMap::new(),
        HashSet::new(),
    );

    assert!(result.forecasts.is_empty());
    assert!(result.aggregates.is_empty());
    assert!(result.risk_rows.is_empty());
    assert_eq!(result.skipped.len(), 1);
}

#[test]
fn test_scenario_08_regional_aggregation() {
    // 同料号两个区域是独立实体,区域聚合只含本区域
    let sales = vec![
        wide_row(&[
            ("Part Number", "PN-1"),
            ("Geo Region", "APAC"),
            ("2024-01", "10"),
            ("2024-02", "12"),
            ("2024-03", "14"),
        ]),
        wide_row(&[
            ("Part Number", "PN-1"),
            ("Geo Region", "EMEA"),
            ("2024-01", "100"),
            ("2024-02", "120"),
            ("2024-03", "140"),
        ]),
    ];
    let config = config(2);
    let reshaper = Reshaper::new(&config);
    let report = reshaper.reshape_wide(&sales).unwrap();
    let orchestrator = DemandPlanOrchestrator::new(config).unwrap();
    let input = PlanInput {
        sales_records: report.records,
        ..Default::default()
    };

    let all = orchestrator.run(&input, &GroupKey::All, &LinearTrendOracle::new());
    let apac = orchestrator.run(
        &input,
        &GroupKey::Region("APAC".to_string()),
        &LinearTrendOracle::new(),
    );

    assert_eq!(all.aggregates.len(), 2);
    assert_eq!(apac.aggregates.len(), 2);
    // 区域聚合严格小于全量聚合 (EMEA 量级更大)
    for (a, b) in apac.aggregates.iter().zip(all.aggregates.iter()) {
        assert!(a.total_forecast_qty < b.total_forecast_qty);
    }
}
