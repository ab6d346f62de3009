// ==========================================
// 需求预测与补货风险分析 - CLI 入口
// ==========================================
// 用法:
//   demand-planner <sales.csv> [选项]
// 选项:
//   --inventory <path>   库存快照 CSV
//   --backorder <path>   欠交快照 CSV
//   --flagged <path>     外部已标记过剩料号 CSV
//   --config <path>      JSON 配置文件
//   --horizon <n>        预测期数 (覆盖配置)
//   --region <R>         聚合区域 (缺省聚合全部)
//   --out <dir>          输出目录 (缺省 demand_plan_output)
// ==========================================

use anyhow::{bail, Context};
use csv::ReaderBuilder;
use demand_planner::engine::{DemandPlanOrchestrator, GroupKey, PlanInput};
use demand_planner::importer::{ImportError, Reshaper, SnapshotMapper};
use demand_planner::oracle::LinearTrendOracle;
use demand_planner::{export, logging, PlannerConfig};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("需求预测与补货风险分析 - 决策支持系统");
    tracing::info!("系统版本: {}", demand_planner::VERSION);
    tracing::info!("==================================================");

    let args = CliArgs::parse(std::env::args().skip(1))?;

    // 配置: 文件 → 命令行覆盖 → 校验 (编排器构造时执行)
    let mut config = match &args.config_path {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(horizon) = args.horizon {
        config.horizon_periods = horizon;
    }

    // 销售历史: 宽表/长表自动识别
    let sales_rows = read_csv_rows(&args.sales_path)?;
    let reshaper = Reshaper::new(&config);
    let report = if is_wide_table(&sales_rows) {
        tracing::info!("识别为宽表 (每月一列)");
        reshaper.reshape_wide(&sales_rows)?
    } else {
        tracing::info!("识别为长表 (Date/PN/Sales Qty)");
        reshaper.reshape_long(&sales_rows)?
    };
    tracing::info!(
        records = report.records.len(),
        dropped_rows = report.dropped_rows,
        dropped_cells = report.dropped_cells,
        rejected = report.rejected.len(),
        "销售历史重塑完成"
    );
    for cell in &report.rejected {
        tracing::warn!(row = cell.row, column = %cell.column, "{}", cell.message);
    }

    // 快照表 (可选)
    let mapper = SnapshotMapper::new();
    let inventory = match &args.inventory_path {
        Some(path) => mapper.map_inventory(&read_csv_rows(path)?)?,
        None => HashMap::new(),
    };
    let backorders = match &args.backorder_path {
        Some(path) => mapper.map_backorders(&read_csv_rows(path)?)?,
        None => HashMap::new(),
    };
    let flagged = match &args.flagged_path {
        Some(path) => mapper.map_flagged(&read_csv_rows(path)?),
        None => Default::default(),
    };

    // 执行管道
    let group = match &args.region {
        Some(region) => GroupKey::Region(region.clone()),
        None => GroupKey::All,
    };
    let orchestrator = DemandPlanOrchestrator::new(config)?;
    let input = PlanInput {
        sales_records: report.records,
        inventory,
        backorders,
        flagged,
    };
    let result = orchestrator.run(&input, &group, &LinearTrendOracle::new());

    // 导出
    export::export_plan_result(&args.out_dir, &result)
        .with_context(|| format!("导出失败: {}", args.out_dir.display()))?;

    tracing::info!(
        run_id = %result.run_id,
        forecasts = result.forecasts.len(),
        risk_rows = result.risk_rows.len(),
        skipped = result.skipped.len(),
        out = %args.out_dir.display(),
        "运行结束"
    );
    Ok(())
}

// ==========================================
// 命令行参数
// ==========================================
struct CliArgs {
    sales_path: PathBuf,
    inventory_path: Option<PathBuf>,
    backorder_path: Option<PathBuf>,
    flagged_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    horizon: Option<usize>,
    region: Option<String>,
    out_dir: PathBuf,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let sales_path = match args.next() {
            Some(p) if !p.starts_with("--") => PathBuf::from(p),
            _ => bail!("用法: demand-planner <sales.csv> [--inventory <path>] [--backorder <path>] [--flagged <path>] [--config <path>] [--horizon <n>] [--region <R>] [--out <dir>]"),
        };

        let mut parsed = Self {
            sales_path,
            inventory_path: None,
            backorder_path: None,
            flagged_path: None,
            config_path: None,
            horizon: None,
            region: None,
            out_dir: PathBuf::from("demand_plan_output"),
        };

        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("选项 {} 缺少取值", flag))
            };
            match flag.as_str() {
                "--inventory" => parsed.inventory_path = Some(PathBuf::from(value()?)),
                "--backorder" => parsed.backorder_path = Some(PathBuf::from(value()?)),
                "--flagged" => parsed.flagged_path = Some(PathBuf::from(value()?)),
                "--config" => parsed.config_path = Some(PathBuf::from(value()?)),
                "--horizon" => {
                    let raw = value()?;
                    parsed.horizon =
                        Some(raw.parse().with_context(|| format!("horizon 非法: {}", raw))?)
                }
                "--region" => parsed.region = Some(value()?),
                "--out" => parsed.out_dir = PathBuf::from(value()?),
                other => bail!("未知选项: {}", other),
            }
        }
        Ok(parsed)
    }
}

// ==========================================
// CSV 输入适配 (核心只接收已解析的行)
// ==========================================

/// CSV → 行映射 (表头修剪,跳过全空行)
fn read_csv_rows(path: &Path) -> Result<Vec<HashMap<String, String>>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)
        .map_err(|e| ImportError::CsvParseError(format!("{}: {}", path.display(), e)))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::CsvParseError(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::CsvParseError(e.to_string()))?;
        let mut row_map = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }
        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row_map);
    }
    Ok(rows)
}

/// 宽表判定: 存在以 4 位数字 + '-' 开头的列名
fn is_wide_table(rows: &[HashMap<String, String>]) -> bool {
    rows.iter().flat_map(|row| row.keys()).any(|column| {
        let bytes = column.as_bytes();
        bytes.len() >= 5
            && bytes[..4].iter().all(|b| b.is_ascii_digit())
            && bytes[4] == b'-'
    })
}
